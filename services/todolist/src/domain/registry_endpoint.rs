/// OneAgentバージョンレジストリのエンドポイント定義
///
/// Dynatraceのデプロイメント APIには歴史的に2つのパスが存在する。
/// どちらのレスポンス形式（フラット/エンベロープ）も解析側で吸収するため、
/// ここではパスとAcceptヘッダーのみを区別する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryEndpoint {
    /// `/api/v1/deployment/lambda/agent/latest`
    #[default]
    Current,
    /// `/api/v1/deployment/agent/lambda/latest`
    Legacy,
}

impl RegistryEndpoint {
    /// ベースURLからの相対パス
    pub fn path(&self) -> &'static str {
        match self {
            RegistryEndpoint::Current => "/api/v1/deployment/lambda/agent/latest",
            RegistryEndpoint::Legacy => "/api/v1/deployment/agent/lambda/latest",
        }
    }

    /// 送信するAcceptヘッダー値
    pub fn accept(&self) -> &'static str {
        match self {
            RegistryEndpoint::Current => "application/json",
            RegistryEndpoint::Legacy => "*/*",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_current() {
        assert_eq!(RegistryEndpoint::default(), RegistryEndpoint::Current);
    }

    #[test]
    fn test_current_endpoint() {
        let endpoint = RegistryEndpoint::Current;
        assert_eq!(endpoint.path(), "/api/v1/deployment/lambda/agent/latest");
        assert_eq!(endpoint.accept(), "application/json");
    }

    #[test]
    fn test_legacy_endpoint() {
        let endpoint = RegistryEndpoint::Legacy;
        assert_eq!(endpoint.path(), "/api/v1/deployment/agent/lambda/latest");
        assert_eq!(endpoint.accept(), "*/*");
    }
}
