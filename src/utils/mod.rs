//! Utility module: errors and logging.

pub mod errors;
pub mod logging;

pub use errors::{BridgeError, Result};
pub use logging::init_logging;
