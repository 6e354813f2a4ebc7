/// DynamoDBでTodoアイテムを管理するリポジトリ
use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::domain::{TodoItem, TodoPayload};

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TodoRepositoryError {
    /// 指定IDのアイテムが存在しない
    #[error("Item not found: {0}")]
    NotFound(String),

    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// アイテムの変換に失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Todoアイテム永続化用トレイト
///
/// 実際のDynamoDBとテスト用モックを差し替えられるようにする。
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// 新しいアイテムを保存
    async fn create(&self, item: &TodoItem) -> Result<(), TodoRepositoryError>;

    /// 既存アイテムの本文と完了フラグを更新し、更新後のアイテムを返す
    ///
    /// 存在しないIDは`NotFound`。
    async fn update(
        &self,
        id: &str,
        payload: &TodoPayload,
        updated_at: i64,
    ) -> Result<TodoItem, TodoRepositoryError>;

    /// アイテムを削除
    ///
    /// 存在しないIDは`NotFound`。
    async fn delete(&self, id: &str) -> Result<(), TodoRepositoryError>;

    /// IDでアイテムを取得
    async fn get(&self, id: &str) -> Result<Option<TodoItem>, TodoRepositoryError>;

    /// 全アイテムを取得
    async fn list(&self) -> Result<Vec<TodoItem>, TodoRepositoryError>;
}

/// TodoRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoTodoRepository {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoTodoRepository {
    pub fn new(client: DynamoDbClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    fn key(id: &str) -> (String, AttributeValue) {
        ("id".to_string(), AttributeValue::S(id.to_string()))
    }
}

/// TodoItemをDynamoDBアイテムへ変換
fn to_attributes(item: &TodoItem) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("id".to_string(), AttributeValue::S(item.id.clone())),
        ("item".to_string(), AttributeValue::S(item.item.clone())),
        ("completed".to_string(), AttributeValue::Bool(item.completed)),
        (
            "created_at".to_string(),
            AttributeValue::N(item.created_at.to_string()),
        ),
        (
            "updated_at".to_string(),
            AttributeValue::N(item.updated_at.to_string()),
        ),
    ])
}

/// DynamoDBアイテムからTodoItemを復元
fn from_attributes(
    attributes: &HashMap<String, AttributeValue>,
) -> Result<TodoItem, TodoRepositoryError> {
    let string_field = |name: &str| {
        attributes
            .get(name)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .ok_or_else(|| TodoRepositoryError::SerializationError(format!("Missing {} field", name)))
    };
    let number_field = |name: &str| {
        attributes
            .get(name)
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<i64>().ok())
            .ok_or_else(|| TodoRepositoryError::SerializationError(format!("Missing {} field", name)))
    };

    // completedは古いアイテムに無い場合があるためfalse扱い
    let completed = attributes
        .get("completed")
        .and_then(|v| v.as_bool().ok())
        .copied()
        .unwrap_or(false);

    Ok(TodoItem {
        id: string_field("id")?,
        item: string_field("item")?,
        completed,
        created_at: number_field("created_at")?,
        updated_at: number_field("updated_at")?,
    })
}

#[async_trait]
impl TodoRepository for DynamoTodoRepository {
    async fn create(&self, item: &TodoItem) -> Result<(), TodoRepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_attributes(item)))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| TodoRepositoryError::WriteError(e.to_string()))?;

        debug!(id = %item.id, "アイテムを作成");
        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        payload: &TodoPayload,
        updated_at: i64,
    ) -> Result<TodoItem, TodoRepositoryError> {
        let (key_name, key_value) = Self::key(id);

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .update_expression("SET #item = :item, completed = :completed, updated_at = :updated_at")
            .condition_expression("attribute_exists(id)")
            // itemはDynamoDBの予約語
            .expression_attribute_names("#item", "item")
            .expression_attribute_values(":item", AttributeValue::S(payload.item.clone()))
            .expression_attribute_values(":completed", AttributeValue::Bool(payload.completed))
            .expression_attribute_values(":updated_at", AttributeValue::N(updated_at.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                UpdateItemError::ConditionalCheckFailedException(_) => {
                    TodoRepositoryError::NotFound(id.to_string())
                }
                other => TodoRepositoryError::WriteError(other.to_string()),
            })?;

        let attributes = result.attributes.ok_or_else(|| {
            TodoRepositoryError::SerializationError("Missing updated attributes".to_string())
        })?;

        from_attributes(&attributes)
    }

    async fn delete(&self, id: &str) -> Result<(), TodoRepositoryError> {
        let (key_name, key_value) = Self::key(id);

        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| TodoRepositoryError::WriteError(e.to_string()))?;

        // 削除前のアイテムが無ければ存在しなかった
        match result.attributes {
            Some(attributes) if !attributes.is_empty() => Ok(()),
            _ => Err(TodoRepositoryError::NotFound(id.to_string())),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<TodoItem>, TodoRepositoryError> {
        let (key_name, key_value) = Self::key(id);

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(key_name, key_value)
            .send()
            .await
            .map_err(|e| TodoRepositoryError::ReadError(e.to_string()))?;

        result.item.as_ref().map(from_attributes).transpose()
    }

    async fn list(&self) -> Result<Vec<TodoItem>, TodoRepositoryError> {
        let mut items = Vec::new();
        let mut exclusive_start_key = None;

        // 1MB単位のページングを最後まで辿る
        loop {
            let result = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await
                .map_err(|e| TodoRepositoryError::ReadError(e.to_string()))?;

            for attributes in result.items() {
                items.push(from_attributes(attributes)?);
            }

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        debug!(count = items.len(), "アイテム一覧を取得");
        Ok(items)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn sample_item() -> TodoItem {
        TodoItem {
            id: "3f2c1a9e-0000-4000-8000-000000000001".to_string(),
            item: "buy milk".to_string(),
            completed: true,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_100,
        }
    }

    // ==================== エラー型 ====================

    #[test]
    fn test_error_display() {
        assert_eq!(
            TodoRepositoryError::NotFound("abc".to_string()).to_string(),
            "Item not found: abc"
        );
        assert_eq!(
            TodoRepositoryError::WriteError("throttled".to_string()).to_string(),
            "Write error: throttled"
        );
        assert_eq!(
            TodoRepositoryError::ReadError("timeout".to_string()).to_string(),
            "Read error: timeout"
        );
    }

    // ==================== 属性変換 ====================

    #[test]
    fn test_to_attributes() {
        let attributes = to_attributes(&sample_item());

        assert_eq!(
            attributes.get("id").unwrap().as_s().unwrap(),
            "3f2c1a9e-0000-4000-8000-000000000001"
        );
        assert_eq!(attributes.get("item").unwrap().as_s().unwrap(), "buy milk");
        assert!(*attributes.get("completed").unwrap().as_bool().unwrap());
        assert_eq!(attributes.get("created_at").unwrap().as_n().unwrap(), "1700000000");
        assert_eq!(attributes.get("updated_at").unwrap().as_n().unwrap(), "1700000100");
    }

    #[test]
    fn test_from_attributes_restores_item() {
        let item = sample_item();
        let restored = from_attributes(&to_attributes(&item)).unwrap();
        assert_eq!(restored, item);
    }

    #[test]
    fn test_from_attributes_missing_completed_defaults_to_false() {
        let mut attributes = to_attributes(&sample_item());
        attributes.remove("completed");

        let restored = from_attributes(&attributes).unwrap();
        assert!(!restored.completed);
    }

    #[test]
    fn test_from_attributes_missing_item() {
        let mut attributes = to_attributes(&sample_item());
        attributes.remove("item");

        let result = from_attributes(&attributes);
        assert_eq!(
            result,
            Err(TodoRepositoryError::SerializationError("Missing item field".to_string()))
        );
    }

    #[test]
    fn test_from_attributes_invalid_timestamp() {
        let mut attributes = to_attributes(&sample_item());
        attributes.insert("created_at".to_string(), AttributeValue::N("soon".to_string()));

        assert!(from_attributes(&attributes).is_err());
    }

    // ==================== モック ====================

    /// ユニットテスト用のモックTodoRepository
    #[derive(Debug, Clone, Default)]
    pub struct MockTodoRepository {
        /// 保存されたアイテム: id -> TodoItem
        items: Arc<Mutex<HashMap<String, TodoItem>>>,
        /// 次の操作で返すエラー
        next_error: Arc<Mutex<Option<TodoRepositoryError>>>,
        /// 呼び出された操作数
        calls: Arc<Mutex<usize>>,
    }

    impl MockTodoRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_items(items: Vec<TodoItem>) -> Self {
            let repo = Self::new();
            {
                let mut stored = repo.items.lock().unwrap();
                for item in items {
                    stored.insert(item.id.clone(), item);
                }
            }
            repo
        }

        pub fn set_next_error(&self, error: TodoRepositoryError) {
            *self.next_error.lock().unwrap() = Some(error);
        }

        pub fn stored(&self, id: &str) -> Option<TodoItem> {
            self.items.lock().unwrap().get(id).cloned()
        }

        pub fn len(&self) -> usize {
            self.items.lock().unwrap().len()
        }

        pub fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }

        fn begin(&self) -> Result<(), TodoRepositoryError> {
            *self.calls.lock().unwrap() += 1;
            match self.next_error.lock().unwrap().take() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl TodoRepository for MockTodoRepository {
        async fn create(&self, item: &TodoItem) -> Result<(), TodoRepositoryError> {
            self.begin()?;
            self.items
                .lock()
                .unwrap()
                .insert(item.id.clone(), item.clone());
            Ok(())
        }

        async fn update(
            &self,
            id: &str,
            payload: &TodoPayload,
            updated_at: i64,
        ) -> Result<TodoItem, TodoRepositoryError> {
            self.begin()?;
            let mut items = self.items.lock().unwrap();
            let item = items
                .get_mut(id)
                .ok_or_else(|| TodoRepositoryError::NotFound(id.to_string()))?;
            item.item = payload.item.clone();
            item.completed = payload.completed;
            item.updated_at = updated_at;
            Ok(item.clone())
        }

        async fn delete(&self, id: &str) -> Result<(), TodoRepositoryError> {
            self.begin()?;
            self.items
                .lock()
                .unwrap()
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| TodoRepositoryError::NotFound(id.to_string()))
        }

        async fn get(&self, id: &str) -> Result<Option<TodoItem>, TodoRepositoryError> {
            self.begin()?;
            Ok(self.items.lock().unwrap().get(id).cloned())
        }

        async fn list(&self) -> Result<Vec<TodoItem>, TodoRepositoryError> {
            self.begin()?;
            let mut items: Vec<TodoItem> = self.items.lock().unwrap().values().cloned().collect();
            items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Ok(items)
        }
    }

    #[tokio::test]
    async fn test_mock_update_missing_is_not_found() {
        let repo = MockTodoRepository::new();
        let payload = TodoPayload {
            item: "x".to_string(),
            completed: false,
        };

        let result = repo.update("missing", &payload, 0).await;
        assert_eq!(result, Err(TodoRepositoryError::NotFound("missing".to_string())));
    }
}
