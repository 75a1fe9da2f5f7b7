// Service modules
pub mod auth;
pub mod catalog;
pub mod database;
pub mod http_server;
pub mod local;
pub mod process;
pub mod remote;
pub mod service_config;
pub mod service_state;

// App state (configuration, paths)
pub mod state;

// Re-exports for consumers
pub use process::{spawn_service, start_service, ProcessError, ShutdownHandle};
pub use service_config::Config as ServiceConfig;
pub use service_state::State as ServiceState;
pub use state::{AppConfig, AppState, StateError};
