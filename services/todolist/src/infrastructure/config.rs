/// Todoテーブル接続設定
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

/// テーブル名を指定する環境変数
pub const TODO_TABLE_ENV: &str = "DYNAMODB_TABLE";

/// Todoテーブル設定のエラー型
#[derive(Debug, Error)]
pub enum TodoTableConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// テーブル名とクライアントを持つDynamoDB設定
///
/// テーブル名は環境変数`DYNAMODB_TABLE`で設定する。
#[derive(Debug, Clone)]
pub struct TodoTableConfig {
    /// DynamoDBクライアントインスタンス
    client: DynamoDbClient,
    /// Todoテーブル名
    table_name: String,
}

impl TodoTableConfig {
    /// 環境からAWS設定を読み込み、環境変数からテーブル名を読み取って設定を作成
    ///
    /// 環境変数:
    /// - AWS認証情報: aws-configにより自動読み込み
    /// - DYNAMODB_TABLE: TodoアイテムのDynamoDBテーブル名
    pub async fn from_env() -> Result<Self, TodoTableConfigError> {
        // テーブル名が無ければAWS設定の読み込み前に失敗させる
        let table_name = table_name_from_env()?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);

        Ok(Self { client, table_name })
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(client: DynamoDbClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// DynamoDBクライアントへの参照を取得
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    /// テーブル名を取得
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

fn table_name_from_env() -> Result<String, TodoTableConfigError> {
    std::env::var(TODO_TABLE_ENV)
        .ok()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| TodoTableConfigError::MissingEnvVar(TODO_TABLE_ENV.to_string()))
}
