/// Todoアイテム作成Lambda（POST /todos）
use lambda_http::{Body, Error, Request, Response, run, service_fn};
use todolist::application::TodoHandler;
use todolist::infrastructure::{DynamoTodoRepository, TodoTableConfig, init_logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // DynamoDBクライアントはコールドスタート時に1回だけ作成
    let config = TodoTableConfig::from_env().await?;
    let repo = DynamoTodoRepository::new(config.client().clone(), config.table_name());
    let handler = TodoHandler::new(repo);

    info!(table = config.table_name(), "create_item Lambda関数を初期化");

    run(service_fn(|request| handle(&handler, request))).await
}

async fn handle(
    handler: &TodoHandler<DynamoTodoRepository>,
    request: Request,
) -> Result<Response<Body>, Error> {
    let response = handler.create(request.body()).await?;
    Ok(response.into_http()?)
}
