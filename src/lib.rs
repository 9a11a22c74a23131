//! tipbridge: serve a handful of lnd gRPC calls over plain HTTP.
//!
//! - `credentials`: tls.cert / admin.macaroon loading and macaroon decoding
//! - `lnrpc`: the lnd message types and service client
//! - `lnd`: authenticated channel to the daemon, per-call deadlines
//! - `rpc`: axum routes and handlers
//! - `node`: configuration, startup sequence, CLI

pub mod credentials;
pub mod lnd;
pub mod lnrpc;
pub mod node;
pub mod rpc;
pub mod utils;

pub use node::{Bridge, BridgeConfig, RunningBridge};
pub use utils::{BridgeError, Result};
