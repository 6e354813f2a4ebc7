// アプリケーション層モジュール
pub mod layer_arn_resolver;
pub mod todo_handler;

// 再エクスポート
pub use layer_arn_resolver::{
    registry_url, LayerArnResolver, ResolveError, CONNECTION_BASE_URL_PATH, PAAS_TOKEN_PATH,
    REGION_PATH,
};
pub use todo_handler::{delay_param, path_id, TodoHandler, TodoHandlerError, TodoResponse};
