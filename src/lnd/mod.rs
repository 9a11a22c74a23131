//! Adapter over lnd's gRPC API: dialing, per-call macaroon auth, deadlines.

pub mod adapter;
pub mod interceptor;

pub use adapter::{LndAdapter, LndConfig};
pub use interceptor::MacaroonInterceptor;
