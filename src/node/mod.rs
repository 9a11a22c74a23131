pub mod bridge;
pub mod cli;
pub mod config;
pub mod service_handle;

pub use bridge::{Bridge, RunningBridge};
pub use cli::run_cli;
pub use config::{BridgeConfig, BridgeOptions};
pub use service_handle::ServiceHandle;
