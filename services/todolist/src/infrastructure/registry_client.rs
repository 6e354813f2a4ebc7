// RegistryClient - OneAgentバージョンレジストリ用HTTPクライアント
//
// Dynatraceのデプロイメント APIから最新のOneAgentレイヤー名を取得する。
// 再試行は行わない。失敗はそのまま呼び出し元（デプロイツール）へ返す。

use super::resolver_config::ResolverConfig;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// RegistryClient用エラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryClientError {
    /// 200以外のステータス
    #[error("HTTPステータスエラー: status={0}")]
    UnexpectedStatus(u16),

    /// 送信・受信の失敗（接続エラー、タイムアウト、ボディ読み込み失敗）
    #[error("リクエスト失敗: {0}")]
    Request(String),

    /// HTTPクライアントの構築失敗
    #[error("HTTPクライアントの構築に失敗: {0}")]
    Build(String),
}

/// レジストリへの1回分のリクエスト
#[derive(Clone)]
pub struct RegistryRequest {
    /// 問い合わせ先URL
    pub url: Url,
    /// Acceptヘッダー値
    pub accept: &'static str,
    /// PaaSトークン
    pub paas_token: String,
}

impl std::fmt::Debug for RegistryRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryRequest")
            .field("url", &self.url.as_str())
            .field("accept", &self.accept)
            .finish_non_exhaustive()
    }
}

impl RegistryRequest {
    /// Authorizationヘッダー値（`Api-Token {token}`）
    pub fn authorization(&self) -> String {
        format!("Api-Token {}", self.paas_token)
    }
}

/// レジストリ取得トレイト（テスト用の抽象化）
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// GETリクエストを送り、200応答のボディ全体を返す
    ///
    /// # 戻り値
    /// * `Ok(String)` - レスポンスボディ
    /// * `Err(RegistryClientError::UnexpectedStatus)` - 200以外（ボディは読まない）
    /// * `Err(RegistryClientError::Request)` - 通信エラー
    async fn fetch(&self, request: &RegistryRequest) -> Result<String, RegistryClientError>;
}

/// reqwestを使用したRegistryClient実装
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: Client,
}

impl HttpRegistryClient {
    /// 設定のタイムアウトでクライアントを作成
    pub fn new(config: &ResolverConfig) -> Result<Self, RegistryClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| RegistryClientError::Build(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn fetch(&self, request: &RegistryRequest) -> Result<String, RegistryClientError> {
        debug!("OneAgentレイヤー名を取得");

        let response = self
            .client
            .get(request.url.clone())
            .header(ACCEPT, request.accept)
            .header(AUTHORIZATION, request.authorization())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "レジストリへのリクエスト失敗");
                RegistryClientError::Request(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = %status, "レジストリが200以外を返却");
            return Err(RegistryClientError::UnexpectedStatus(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            warn!(error = %e, "レスポンスボディの読み込み失敗");
            RegistryClientError::Request(e.to_string())
        })
    }
}
