// OneAgentレイヤーARNのドメインモデル
//
// レジストリが返す部分レイヤー名（ランタイム名 → 部分レイヤー名）を
// 完全修飾されたLambdaレイヤーARNへ変換する。

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// OneAgentレイヤーを公開しているAWSアカウントID
pub const ONEAGENT_LAYER_ACCOUNT: &str = "725887861453";

/// 単一ランタイム解決のショートカットとして提供するランタイム名
pub const SUPPORTED_RUNTIMES: [&str; 3] = ["nodejs", "python", "java"];

/// レジストリレスポンスのエンベロープ形式で使われるフィールド名
const VERSIONS_FIELD: &str = "versions";

/// レジストリレスポンス解析のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayerVersionsError {
    /// JSONとして解析できない
    #[error("JSONの解析に失敗: {0}")]
    InvalidJson(String),

    /// 想定外のJSON構造
    #[error("想定外のレスポンス構造: {0}")]
    UnexpectedShape(String),
}

/// 部分レイヤー名からARNを構築する
///
/// 形式: `arn:aws:lambda:{region}:725887861453:layer:{partial}_{runtime}:1`
pub fn layer_arn(region: &str, partial_layer_name: &str, runtime: &str) -> String {
    format!(
        "arn:aws:lambda:{}:{}:layer:{}_{}:1",
        region, ONEAGENT_LAYER_ACCOUNT, partial_layer_name, runtime
    )
}

/// レジストリから取得したランタイムごとの部分レイヤー名
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayerVersions {
    versions: BTreeMap<String, String>,
}

impl LayerVersions {
    pub fn new(versions: BTreeMap<String, String>) -> Self {
        Self { versions }
    }

    /// レジストリのレスポンスボディを解析する
    ///
    /// 2種類の形式を受け付ける:
    /// - フラット: `{"nodejs": "Dynatrace_OneAgent_1_217_1"}`
    /// - エンベロープ: `{"versions": {"nodejs": "Dynatrace_OneAgent_1_217_1"}}`
    ///
    /// `versions`フィールドの有無で形式を判定する。
    pub fn parse(body: &str) -> Result<Self, LayerVersionsError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| LayerVersionsError::InvalidJson(e.to_string()))?;

        let mapping = match value {
            Value::Object(mut object) => match object.remove(VERSIONS_FIELD) {
                Some(versions) => versions,
                None => Value::Object(object),
            },
            other => {
                return Err(LayerVersionsError::UnexpectedShape(format!(
                    "オブジェクトを期待したが{}を受信",
                    json_type_name(&other)
                )));
            }
        };

        let versions: BTreeMap<String, String> = serde_json::from_value(mapping)
            .map_err(|e| LayerVersionsError::UnexpectedShape(e.to_string()))?;

        Ok(Self { versions })
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// 指定リージョンのレイヤーARNマップへ変換する
    ///
    /// キーの追加・削除は行わない。
    pub fn into_layer_arns(self, region: &str) -> LayerArnMap {
        let arns = self
            .versions
            .into_iter()
            .map(|(runtime, partial)| {
                let arn = layer_arn(region, &partial, &runtime);
                (runtime, arn)
            })
            .collect();

        LayerArnMap { arns }
    }
}

/// ランタイム名 → 完全修飾レイヤーARN
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct LayerArnMap {
    arns: BTreeMap<String, String>,
}

impl LayerArnMap {
    /// ランタイムのARNを取得（存在しなければNone）
    pub fn get(&self, runtime: &str) -> Option<&str> {
        self.arns.get(runtime).map(String::as_str)
    }

    /// 指定ランタイムのARNを取り出す
    pub fn take(mut self, runtime: &str) -> Option<String> {
        self.arns.remove(runtime)
    }

    pub fn len(&self) -> usize {
        self.arns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.arns.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ARN構築 ====================

    #[test]
    fn test_layer_arn_format() {
        assert_eq!(
            layer_arn("us-east-1", "Dynatrace_OneAgent_1_217_1", "nodejs"),
            "arn:aws:lambda:us-east-1:725887861453:layer:Dynatrace_OneAgent_1_217_1_nodejs:1"
        );
    }

    // ==================== レスポンス解析 ====================

    #[test]
    fn test_parse_envelope() {
        let versions =
            LayerVersions::parse(r#"{"versions":{"nodejs":"Dynatrace_OneAgent_1_217_1"}}"#)
                .unwrap();

        let arns = versions.into_layer_arns("us-east-1");
        assert_eq!(arns.len(), 1);
        assert_eq!(
            arns.get("nodejs"),
            Some("arn:aws:lambda:us-east-1:725887861453:layer:Dynatrace_OneAgent_1_217_1_nodejs:1")
        );
    }

    #[test]
    fn test_parse_flat() {
        let versions = LayerVersions::parse(r#"{"python":"Dynatrace_OneAgent_1_217_10"}"#).unwrap();

        let arns = versions.into_layer_arns("eu-west-1");
        assert_eq!(
            arns.get("python"),
            Some("arn:aws:lambda:eu-west-1:725887861453:layer:Dynatrace_OneAgent_1_217_10_python:1")
        );
    }

    /// エンベロープ形式とフラット形式で同じ結果になる
    #[test]
    fn test_envelope_and_flat_are_equivalent() {
        let flat = r#"{"nodejs":"A_1","python":"A_2","java":"A_3"}"#;
        let envelope = format!(r#"{{"versions":{}}}"#, flat);

        let from_flat = LayerVersions::parse(flat).unwrap();
        let from_envelope = LayerVersions::parse(&envelope).unwrap();

        assert_eq!(from_flat, from_envelope);
        assert_eq!(
            from_flat.into_layer_arns("ap-northeast-1"),
            from_envelope.into_layer_arns("ap-northeast-1")
        );
    }

    /// エンベロープの他のフィールドは無視される
    #[test]
    fn test_envelope_ignores_sibling_fields() {
        let versions =
            LayerVersions::parse(r#"{"versions":{"java":"X"},"generatedAt":"2021-05-01"}"#)
                .unwrap();

        assert_eq!(versions.len(), 1);
    }

    #[test]
    fn test_parse_empty_object() {
        let versions = LayerVersions::parse("{}").unwrap();
        assert!(versions.is_empty());
        assert!(versions.into_layer_arns("us-east-1").is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = LayerVersions::parse("not valid json");
        assert!(matches!(result, Err(LayerVersionsError::InvalidJson(_))));
    }

    #[test]
    fn test_parse_non_object() {
        let result = LayerVersions::parse(r#"["nodejs"]"#);
        match result {
            Err(LayerVersionsError::UnexpectedShape(msg)) => assert!(msg.contains("array")),
            other => panic!("UnexpectedShapeを期待: {:?}", other),
        }
    }

    #[test]
    fn test_parse_non_string_layer_name() {
        let result = LayerVersions::parse(r#"{"nodejs": 1}"#);
        assert!(matches!(result, Err(LayerVersionsError::UnexpectedShape(_))));
    }

    #[test]
    fn test_parse_versions_field_not_object() {
        let result = LayerVersions::parse(r#"{"versions": "1.217"}"#);
        assert!(matches!(result, Err(LayerVersionsError::UnexpectedShape(_))));
    }

    // ==================== LayerArnMap ====================

    #[test]
    fn test_every_runtime_key_is_kept() {
        let mut input = BTreeMap::new();
        input.insert("nodejs".to_string(), "Dynatrace_OneAgent_1_217_1".to_string());
        input.insert("python".to_string(), "Dynatrace_OneAgent_1_217_1".to_string());
        input.insert("java".to_string(), "Dynatrace_OneAgent_1_217_10".to_string());
        input.insert("go".to_string(), "Dynatrace_OneAgent_1_230_0".to_string());

        let arns = LayerVersions::new(input.clone()).into_layer_arns("sa-east-1");

        assert_eq!(arns.len(), input.len());
        for (runtime, partial) in &input {
            assert_eq!(
                arns.get(runtime).unwrap(),
                format!("arn:aws:lambda:sa-east-1:725887861453:layer:{}_{}:1", partial, runtime)
            );
        }
    }

    #[test]
    fn test_take_missing_runtime_is_none() {
        let arns = LayerVersions::parse(r#"{"nodejs":"X"}"#)
            .unwrap()
            .into_layer_arns("us-east-1");

        assert!(arns.clone().take("nodejs").is_some());
        assert!(arns.take("ruby").is_none());
    }

    #[test]
    fn test_layer_arn_map_serializes_as_object() {
        let arns = LayerVersions::parse(r#"{"nodejs":"X"}"#)
            .unwrap()
            .into_layer_arns("us-east-1");

        let json = serde_json::to_value(&arns).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"nodejs": "arn:aws:lambda:us-east-1:725887861453:layer:X_nodejs:1"})
        );
    }

    #[test]
    fn test_error_display() {
        let error = LayerVersionsError::InvalidJson("expected value".to_string());
        assert!(error.to_string().contains("expected value"));
    }
}
