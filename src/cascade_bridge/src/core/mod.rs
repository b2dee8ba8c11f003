pub mod config;
pub mod http_error;
pub mod state;

pub use config::BridgeConfig;
pub use http_error::ApiError;
pub use state::{AppState, SharedState};
