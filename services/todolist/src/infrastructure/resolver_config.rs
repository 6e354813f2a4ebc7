// レイヤーARNリゾルバーの設定
//
// PaaSトークンの環境変数フォールバックとHTTPタイムアウトを保持する。
// 環境変数の読み取りはfrom_env()だけに閉じ込め、リゾルバー本体には値として渡す。

use crate::domain::RegistryEndpoint;
use std::time::Duration;

/// PaaSトークンのフォールバックに使う環境変数
pub const PAAS_TOKEN_ENV: &str = "DT_PAAS_TOKEN";

/// リクエストタイムアウトのデフォルト（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 接続タイムアウト（秒）
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// リゾルバー設定
#[derive(Clone)]
pub struct ResolverConfig {
    /// 設定ファイルにトークンが無い場合に使うPaaSトークン
    paas_token_fallback: Option<String>,
    /// 問い合わせ先エンドポイント
    endpoint: RegistryEndpoint,
    /// リクエスト全体のタイムアウト
    request_timeout: Duration,
    /// 接続確立のタイムアウト
    connect_timeout: Duration,
}

impl std::fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("has_paas_token_fallback", &self.paas_token_fallback.is_some())
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            paas_token_fallback: None,
            endpoint: RegistryEndpoint::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl ResolverConfig {
    /// 環境変数`DT_PAAS_TOKEN`をフォールバックとして読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_env() -> Self {
        let paas_token_fallback = std::env::var(PAAS_TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty());

        Self {
            paas_token_fallback,
            ..Self::default()
        }
    }

    pub fn with_paas_token_fallback(mut self, token: impl Into<String>) -> Self {
        self.paas_token_fallback = Some(token.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: RegistryEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn paas_token_fallback(&self) -> Option<&str> {
        self.paas_token_fallback.as_deref()
    }

    pub fn endpoint(&self) -> RegistryEndpoint {
        self.endpoint
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}
