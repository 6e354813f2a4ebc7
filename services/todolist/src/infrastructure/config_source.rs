//! デプロイ設定ソース
//!
//! デプロイツールの設定値をパス（例: `["provider", "region"]`）で引くための抽象化。
//! リゾルバーはこのトレイト越しに設定を参照するため、テストでは任意の値を注入できる。

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// 設定ソース読み込みのエラー型
#[derive(Debug, Error)]
pub enum ConfigSourceError {
    /// ファイル読み込みエラー
    #[error("設定ファイルの読み込みに失敗: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("設定ファイルの解析に失敗: {0}")]
    Parse(#[from] serde_json::Error),
}

/// パス指定で設定値を解決するトレイト
///
/// 値が存在しない場合は`None`を返す。
#[async_trait]
pub trait ConfigurationSource: Send + Sync {
    async fn resolve(&self, path: &[&str]) -> Option<String>;
}

/// JSONドキュメントを辿って設定値を解決する実装
///
/// `serverless print --format json`等でレンダリングした設定を想定する。
/// 文字列はそのまま、数値と真偽値はJSON表記で返す。
/// null・オブジェクト・配列・存在しないキーは未設定として扱う。
#[derive(Debug, Clone)]
pub struct JsonConfigurationSource {
    document: Value,
}

impl JsonConfigurationSource {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    /// JSONファイルから読み込む
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigSourceError> {
        let content = std::fs::read_to_string(path)?;
        let document = serde_json::from_str(&content)?;
        Ok(Self { document })
    }

    fn lookup(&self, path: &[&str]) -> Option<String> {
        let value = path
            .iter()
            .try_fold(&self.document, |current, key| current.get(*key))?;

        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

#[async_trait]
impl ConfigurationSource for JsonConfigurationSource {
    async fn resolve(&self, path: &[&str]) -> Option<String> {
        self.lookup(path)
    }
}
