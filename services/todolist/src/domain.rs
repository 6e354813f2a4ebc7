// Domain layer modules
pub mod fault_directive;
pub mod layer_arn;
pub mod registry_endpoint;
pub mod todo_item;

// Re-exports
pub use fault_directive::{parse_delay_param, FaultDirectives};
pub use layer_arn::{
    layer_arn, LayerArnMap, LayerVersions, LayerVersionsError, ONEAGENT_LAYER_ACCOUNT,
    SUPPORTED_RUNTIMES,
};
pub use registry_endpoint::RegistryEndpoint;
pub use todo_item::{TodoItem, TodoPayload, TodoValidationError, MAX_ITEM_LENGTH};
