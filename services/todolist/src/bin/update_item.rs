/// Todoアイテム更新Lambda（PUT /todos/{id}）
use lambda_http::{Body, Error, Request, Response, run, service_fn};
use todolist::application::{TodoHandler, path_id};
use todolist::infrastructure::{DynamoTodoRepository, TodoTableConfig, init_logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let config = TodoTableConfig::from_env().await?;
    let repo = DynamoTodoRepository::new(config.client().clone(), config.table_name());
    let handler = TodoHandler::new(repo);

    info!(table = config.table_name(), "update_item Lambda関数を初期化");

    run(service_fn(|request| handle(&handler, request))).await
}

async fn handle(
    handler: &TodoHandler<DynamoTodoRepository>,
    request: Request,
) -> Result<Response<Body>, Error> {
    let response = handler
        .update(path_id(&request), request.body())
        .await?;
    Ok(response.into_http()?)
}
