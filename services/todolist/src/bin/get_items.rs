/// Todoアイテム一覧Lambda（GET /todos?delay=ms）
use lambda_http::{Body, Error, Request, Response, run, service_fn};
use todolist::application::{TodoHandler, delay_param};
use todolist::infrastructure::{DynamoTodoRepository, TodoTableConfig, init_logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let config = TodoTableConfig::from_env().await?;
    let repo = DynamoTodoRepository::new(config.client().clone(), config.table_name());
    let handler = TodoHandler::new(repo);

    info!(table = config.table_name(), "get_items Lambda関数を初期化");

    run(service_fn(|request| handle(&handler, request))).await
}

async fn handle(
    handler: &TodoHandler<DynamoTodoRepository>,
    request: Request,
) -> Result<Response<Body>, Error> {
    let response = handler.list(delay_param(&request)).await;
    Ok(response.into_http()?)
}
