/// Todoアイテムのドメインモデル
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// itemテキストの最大長（バイト）
///
/// DynamoDBのアイテムサイズ上限（400KB）に余裕を持たせた値
pub const MAX_ITEM_LENGTH: usize = 64 * 1024;

/// リクエストボディ検証のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TodoValidationError {
    /// リクエストボディがJSONとして不正
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// itemが空
    #[error("item must not be empty")]
    EmptyItem,

    /// itemが長すぎる
    #[error("item exceeds {max} bytes (got {actual})")]
    ItemTooLong { max: usize, actual: usize },
}

/// 作成・更新リクエストのボディ
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TodoPayload {
    pub item: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoPayload {
    /// JSONボディを解析して検証する
    pub fn from_slice(body: &[u8]) -> Result<Self, TodoValidationError> {
        let payload: TodoPayload = serde_json::from_slice(body)
            .map_err(|e| TodoValidationError::InvalidBody(e.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }

    fn validate(&self) -> Result<(), TodoValidationError> {
        if self.item.trim().is_empty() {
            return Err(TodoValidationError::EmptyItem);
        }
        if self.item.len() > MAX_ITEM_LENGTH {
            return Err(TodoValidationError::ItemTooLong {
                max: MAX_ITEM_LENGTH,
                actual: self.item.len(),
            });
        }
        Ok(())
    }
}

/// 永続化されるTodoアイテム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    /// アイテムID（UUID v4）
    pub id: String,
    /// アイテム本文
    pub item: String,
    /// 完了フラグ
    pub completed: bool,
    /// 作成日時（Unixタイムスタンプ秒）
    pub created_at: i64,
    /// 更新日時（Unixタイムスタンプ秒）
    pub updated_at: i64,
}

impl TodoItem {
    /// 新しいIDでアイテムを作成
    pub fn create(payload: TodoPayload, now: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item: payload.item,
            completed: payload.completed,
            created_at: now,
            updated_at: now,
        }
    }
}
