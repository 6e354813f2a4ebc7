// Infrastructure layer modules
pub mod config;
pub mod config_source;
pub mod logging;
pub mod registry_client;
pub mod resolver_config;
pub mod todo_repository;

// Re-exports
pub use config::{TodoTableConfig, TodoTableConfigError, TODO_TABLE_ENV};
pub use config_source::{ConfigSourceError, ConfigurationSource, JsonConfigurationSource};
pub use logging::{init_cli_logging, init_logging};
pub use registry_client::{HttpRegistryClient, RegistryClient, RegistryClientError, RegistryRequest};
pub use resolver_config::{ResolverConfig, PAAS_TOKEN_ENV};
pub use todo_repository::{DynamoTodoRepository, TodoRepository, TodoRepositoryError};
