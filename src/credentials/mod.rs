//! Credential loading: lnd's TLS certificate and admin macaroon.

pub mod loader;
pub mod macaroon;

pub use loader::{default_lnd_dir, Credentials, MACAROON_FILE, TLS_CERT_FILE};
pub use macaroon::{Macaroon, MacaroonError};
