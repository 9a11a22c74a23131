use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::Interceptor;
use tonic::{Request, Status};

use crate::credentials::Macaroon;
use crate::utils::{BridgeError, Result};

pub const MACAROON_HEADER: &str = "macaroon";

/// Attaches the hex-encoded macaroon to every outgoing call.
#[derive(Clone)]
pub struct MacaroonInterceptor {
    value: MetadataValue<Ascii>,
}

impl MacaroonInterceptor {
    pub fn new(macaroon: &Macaroon) -> Result<Self> {
        let value = macaroon
            .to_hex()
            .parse::<MetadataValue<Ascii>>()
            .map_err(|e| BridgeError::Configuration(format!("macaroon header: {}", e)))?;
        Ok(Self { value })
    }
}

impl Interceptor for MacaroonInterceptor {
    fn call(&mut self, mut req: Request<()>) -> std::result::Result<Request<()>, Status> {
        req.metadata_mut().insert(MACAROON_HEADER, self.value.clone());
        Ok(req)
    }
}
