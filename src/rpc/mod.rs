//! HTTP front end
//!
//! - `GET /tip`: node pubkey plus the tip URL
//! - `GET /get_invoice`: a fresh payment request
//! - `GET /pay_invoice/<payment_request>`: pays it, returns the result text
//! - `GET /health`
//!
//! Handlers reach the node only through the `RpcDeps` trait; wiring passes
//! an `LndAdapter` into `RpcServer::bind()`.

pub mod handlers;
pub mod server;

pub use handlers::{InvoiceParams, RpcDeps, RpcHandler, DEFAULT_TIP_URL};
pub use server::{router, ErrorStatus, RawPaymentRequest, RpcServer};
