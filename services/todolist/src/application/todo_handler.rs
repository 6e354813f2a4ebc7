// Todo APIハンドラー
//
// API Gateway HTTP APIから呼ばれる各Lambda関数の処理本体。
// リクエスト検証 → フォールト注入ディレクティブ → 単一のテーブル操作 → JSONレスポンス。

use crate::domain::{FaultDirectives, TodoItem, TodoPayload, parse_delay_param};
use crate::infrastructure::{TodoRepository, TodoRepositoryError};
use lambda_http::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use lambda_http::{Body, Request, RequestExt, Response};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// `!error`ディレクティブで返す本文
const INJECTED_ERROR_BODY: &str = "Got an error";

/// ハンドラーのエラー型
///
/// レスポンスではなくLambda呼び出し自体の失敗として扱うもの。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TodoHandlerError {
    /// `!exception`ディレクティブによる意図的な失敗
    #[error("{0}")]
    InjectedException(String),
}

/// ステータスコードとJSON本文の組
#[derive(Debug, Clone, PartialEq)]
pub struct TodoResponse {
    pub status: u16,
    pub body: Value,
}

impl TodoResponse {
    fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    fn error(status: u16, message: impl std::fmt::Display) -> Self {
        Self::new(status, json!({ "error": message.to_string() }))
    }

    /// CORSヘッダー付きのHTTPレスポンスへ変換
    pub fn into_http(self) -> Result<Response<Body>, lambda_http::http::Error> {
        Response::builder()
            .status(self.status)
            .header(ACCESS_CONTROL_ALLOW_CREDENTIALS, "true")
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::Text(self.body.to_string()))
    }
}

/// パスパラメータ`id`を取得
pub fn path_id(request: &Request) -> Option<&str> {
    request
        .path_parameters_ref()
        .and_then(|params| params.first("id"))
        .filter(|id| !id.is_empty())
}

/// クエリパラメータ`delay`を取得
pub fn delay_param(request: &Request) -> Option<&str> {
    request
        .query_string_parameters_ref()
        .and_then(|params| params.first("delay"))
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

async fn sleep_as_instructed(delay: Duration) {
    info!(delay_ms = delay.as_millis() as u64, "指示に従い応答を遅延");
    tokio::time::sleep(delay).await;
}

/// Todo APIハンドラー
pub struct TodoHandler<R>
where
    R: TodoRepository,
{
    repo: R,
}

impl<R> TodoHandler<R>
where
    R: TodoRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// 作成・更新で共通のディレクティブ処理
    ///
    /// `Ok(Some(response))`の場合はテーブル操作をせずにそのレスポンスを返す。
    async fn apply_directives(
        &self,
        payload: &TodoPayload,
    ) -> Result<Option<TodoResponse>, TodoHandlerError> {
        let directives = FaultDirectives::parse(&payload.item);

        if let Some(message) = directives.exception {
            warn!(message = %message, "指示に従い例外を送出");
            return Err(TodoHandlerError::InjectedException(message));
        }
        if let Some(delay) = directives.delay {
            sleep_as_instructed(delay).await;
        }
        if let Some(status) = directives.error_status {
            warn!(status, "指示に従いエラー応答");
            return Ok(Some(TodoResponse::new(status, json!(INJECTED_ERROR_BODY))));
        }
        Ok(None)
    }

    /// アイテム作成（POST /todos）
    ///
    /// 成功時は201 `{"created": item}`、検証・保存エラーは400。
    pub async fn create(&self, body: &[u8]) -> Result<TodoResponse, TodoHandlerError> {
        let payload = match TodoPayload::from_slice(body) {
            Ok(payload) => payload,
            Err(err) => return Ok(TodoResponse::error(400, err)),
        };

        if let Some(response) = self.apply_directives(&payload).await? {
            return Ok(response);
        }

        let item = TodoItem::create(payload, now());
        match self.repo.create(&item).await {
            Ok(()) => {
                info!(id = %item.id, "アイテムを作成");
                Ok(TodoResponse::new(201, json!({ "created": item })))
            }
            Err(err) => {
                error!(error = %err, "アイテムの作成に失敗");
                Ok(TodoResponse::error(400, err))
            }
        }
    }

    /// アイテム更新（PUT /todos/{id}）
    ///
    /// 成功時は201 `{"updated": item}`、存在しないIDは404、その他は400。
    pub async fn update(
        &self,
        id: Option<&str>,
        body: &[u8],
    ) -> Result<TodoResponse, TodoHandlerError> {
        let Some(id) = id else {
            return Ok(TodoResponse::error(400, "missing path parameter: id"));
        };
        let payload = match TodoPayload::from_slice(body) {
            Ok(payload) => payload,
            Err(err) => return Ok(TodoResponse::error(400, err)),
        };

        if let Some(response) = self.apply_directives(&payload).await? {
            return Ok(response);
        }

        match self.repo.update(id, &payload, now()).await {
            Ok(item) => {
                info!(id = %id, "アイテムを更新");
                Ok(TodoResponse::new(201, json!({ "updated": item })))
            }
            Err(err @ TodoRepositoryError::NotFound(_)) => Ok(TodoResponse::error(404, err)),
            Err(err) => {
                error!(id = %id, error = %err, "アイテムの更新に失敗");
                Ok(TodoResponse::error(400, err))
            }
        }
    }

    /// アイテム削除（DELETE /todos/{id}）
    pub async fn delete(&self, id: Option<&str>) -> TodoResponse {
        let Some(id) = id else {
            return TodoResponse::error(400, "missing path parameter: id");
        };

        match self.repo.delete(id).await {
            Ok(()) => {
                info!(id = %id, "アイテムを削除");
                TodoResponse::new(204, json!({ "deleted": true }))
            }
            Err(err) => {
                warn!(id = %id, error = %err, "アイテムの削除に失敗");
                TodoResponse::error(404, err)
            }
        }
    }

    /// アイテム取得（GET /todos/{id}）
    pub async fn get(&self, id: Option<&str>) -> TodoResponse {
        let Some(id) = id else {
            return TodoResponse::error(400, "missing path parameter: id");
        };

        match self.repo.get(id).await {
            Ok(Some(item)) => TodoResponse::new(200, json!(item)),
            Ok(None) => TodoResponse::error(404, TodoRepositoryError::NotFound(id.to_string())),
            Err(err) => {
                warn!(id = %id, error = %err, "アイテムの取得に失敗");
                TodoResponse::error(404, err)
            }
        }
    }

    /// アイテム一覧（GET /todos?delay=ms）
    pub async fn list(&self, delay: Option<&str>) -> TodoResponse {
        if let Some(delay) = delay.and_then(parse_delay_param) {
            sleep_as_instructed(delay).await;
        }

        match self.repo.list().await {
            Ok(items) => TodoResponse::new(200, json!(items)),
            Err(err) => {
                warn!(error = %err, "アイテム一覧の取得に失敗");
                TodoResponse::error(404, err)
            }
        }
    }
}
