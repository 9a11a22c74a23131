//! lnd gRPC surface: message types and the Lightning service client.

pub mod client;
pub mod types;

pub use client::LightningClient;
pub use types::{
    AddInvoiceResponse, GetInfoRequest, GetInfoResponse, Invoice, SendRequest, SendResponse,
};
