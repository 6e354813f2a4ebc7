// OneAgentレイヤーARNリゾルバー
//
// デプロイ設定からリージョン・接続ベースURL・PaaSトークンを解決し、
// OneAgentバージョンレジストリに問い合わせてランタイムごとのレイヤーARNを構築する。
// 結果はキャッシュしない。呼び出しごとにレジストリへ問い合わせる。

use crate::domain::{LayerArnMap, LayerVersions, LayerVersionsError, RegistryEndpoint};
use crate::infrastructure::{
    ConfigurationSource, RegistryClient, RegistryClientError, RegistryRequest, ResolverConfig,
};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// PaaSトークンの設定パス
pub const PAAS_TOKEN_PATH: [&str; 3] = ["custom", "queryOneAgentLayerARNs", "paasToken"];

/// AWSリージョンの設定パス
pub const REGION_PATH: [&str; 2] = ["provider", "region"];

/// Dynatrace接続ベースURLの設定パス
pub const CONNECTION_BASE_URL_PATH: [&str; 3] =
    ["custom", "OneAgentConfig", "DT_CONNECTION_BASE_URL"];

/// リゾルバーのエラー型
///
/// どのエラーもその解決呼び出しにとって終端であり、再試行は行わない。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    /// 必須の設定値が解決できない（HTTPリクエストは送信しない）
    #[error("設定が見つかりません: {0}")]
    MissingConfiguration(String),

    /// 接続ベースURLが不正
    #[error("DT_CONNECTION_BASE_URLが不正です: url={url}, reason={reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// レジストリが200以外を返した
    #[error("OneAgentレイヤー名の取得に失敗 - status={status}")]
    RetrievalFailed { status: u16 },

    /// 通信エラー
    #[error("OneAgentレイヤー名のリクエストに失敗: {0}")]
    RequestFailed(String),

    /// レスポンスの解析に失敗
    #[error("レイヤー名の解析に失敗: {0}")]
    ParseFailed(#[from] LayerVersionsError),
}

impl From<RegistryClientError> for ResolveError {
    fn from(err: RegistryClientError) -> Self {
        match err {
            RegistryClientError::UnexpectedStatus(status) => ResolveError::RetrievalFailed { status },
            RegistryClientError::Request(msg) | RegistryClientError::Build(msg) => {
                ResolveError::RequestFailed(msg)
            }
        }
    }
}

/// 接続ベースURLにレジストリのパスを連結する
///
/// ベースURLのパス（Managed環境の`/e/{environment}`等）は保持する。
pub fn registry_url(base_url: &str, endpoint: RegistryEndpoint) -> Result<Url, ResolveError> {
    let invalid = |reason: String| ResolveError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("HTTP(S)のURLではありません".to_string()));
    }

    let path = format!("{}{}", url.path().trim_end_matches('/'), endpoint.path());
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// 空文字列は未設定として扱う
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// レイヤーARNリゾルバー
pub struct LayerArnResolver<C>
where
    C: RegistryClient,
{
    /// レジストリクライアント
    client: C,
    /// 問い合わせ先エンドポイント
    endpoint: RegistryEndpoint,
    /// 設定にトークンが無い場合のフォールバック
    paas_token_fallback: Option<String>,
}

impl<C> LayerArnResolver<C>
where
    C: RegistryClient,
{
    pub fn new(client: C, config: &ResolverConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint(),
            paas_token_fallback: non_empty(config.paas_token_fallback().map(str::to_string)),
        }
    }

    async fn resolve_paas_token<S>(&self, source: &S) -> Option<String>
    where
        S: ConfigurationSource + ?Sized,
    {
        non_empty(source.resolve(&PAAS_TOKEN_PATH).await)
            .or_else(|| self.paas_token_fallback.clone())
    }

    /// 全ランタイムのレイヤーARNを解決する
    ///
    /// # 処理フロー
    /// 1. PaaSトークン・リージョン・接続ベースURLを並行して解決
    /// 2. レジストリへGETリクエスト（200以外は即座に失敗）
    /// 3. レスポンス（フラット/エンベロープ）を解析
    /// 4. ランタイムごとにARNを構築
    #[instrument(skip(self, source), fields(endpoint = ?self.endpoint))]
    pub async fn resolve<S>(&self, source: &S) -> Result<LayerArnMap, ResolveError>
    where
        S: ConfigurationSource + ?Sized,
    {
        let (paas_token, region, base_url) = tokio::join!(
            self.resolve_paas_token(source),
            source.resolve(&REGION_PATH),
            source.resolve(&CONNECTION_BASE_URL_PATH),
        );

        let paas_token = paas_token.ok_or_else(|| {
            ResolveError::MissingConfiguration(
                "custom.queryOneAgentLayerARNs.paasToken と環境変数DT_PAAS_TOKENのどちらも定義されていません"
                    .to_string(),
            )
        })?;
        let region = non_empty(region).ok_or_else(|| {
            ResolveError::MissingConfiguration("AWSリージョン(provider.region)を解決できません".to_string())
        })?;
        let base_url = non_empty(base_url).ok_or_else(|| {
            ResolveError::MissingConfiguration(
                "custom.OneAgentConfigからDT_CONNECTION_BASE_URLを解決できません".to_string(),
            )
        })?;

        let request = RegistryRequest {
            url: registry_url(&base_url, self.endpoint)?,
            accept: self.endpoint.accept(),
            paas_token,
        };
        debug!(url = %request.url, region = %region, "レジストリへ問い合わせ");

        let body = self.client.fetch(&request).await?;
        let versions = LayerVersions::parse(&body)?;
        let arns = versions.into_layer_arns(&region);

        info!(region = %region, runtimes = arns.len(), "OneAgentレイヤーARNを解決");
        Ok(arns)
    }

    /// 指定ランタイムのレイヤーARNだけを解決する
    ///
    /// レジストリに該当ランタイムが無い場合は`Ok(None)`。
    pub async fn resolve_for_runtime<S>(
        &self,
        source: &S,
        runtime: &str,
    ) -> Result<Option<String>, ResolveError>
    where
        S: ConfigurationSource + ?Sized,
    {
        let arn = self.resolve(source).await?.take(runtime);
        if arn.is_none() {
            warn!(runtime = %runtime, "レジストリに該当ランタイムのレイヤーがありません");
        }
        Ok(arn)
    }
}
