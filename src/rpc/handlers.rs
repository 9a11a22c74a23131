use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::lnrpc::{AddInvoiceResponse, GetInfoResponse, Invoice, SendResponse};
use crate::utils::Result;

pub const DEFAULT_TIP_URL: &str = "http://donnerlab.com/get_invoice/";

/// Optional invoice parameters from the `/get_invoice` query string.
/// Both absent is the plain no-argument AddInvoice.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct InvoiceParams {
    /// Amount in satoshis.
    pub value: Option<i64>,
    pub memo: Option<String>,
}

impl InvoiceParams {
    pub fn into_invoice(self) -> Invoice {
        Invoice {
            value: self.value.unwrap_or_default(),
            memo: self.memo.unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// Trait describing what the HTTP handlers need from the node.
/// `LndAdapter` is the production implementation.
#[async_trait]
pub trait RpcDeps: Send + Sync + 'static {
    async fn get_node_info(&self) -> Result<GetInfoResponse>;

    /// Every call creates a fresh invoice.
    async fn create_invoice(&self, params: InvoiceParams) -> Result<AddInvoiceResponse>;

    /// `payment_request` is passed on untouched.
    async fn pay_invoice(&self, payment_request: &str) -> Result<SendResponse>;
}

/// Turns node calls into the plain-text bodies the endpoints serve.
pub struct RpcHandler<D: RpcDeps> {
    deps: Arc<D>,
    tip_url: String,
}

impl<D: RpcDeps> RpcHandler<D> {
    pub fn new(deps: Arc<D>, tip_url: impl Into<String>) -> Self {
        Self { deps, tip_url: tip_url.into() }
    }

    /// GET /tip
    pub async fn tip(&self) -> Result<String> {
        let info = self.deps.get_node_info().await.map_err(|e| {
            warn!("cannot get info from node: {}", e);
            e
        })?;
        info!(pubkey = %info.identity_pubkey, alias = %info.alias, "tip requested");
        Ok(format!("pubkey: {}, {}", info.identity_pubkey, self.tip_url))
    }

    /// GET /get_invoice
    pub async fn get_invoice(&self, params: InvoiceParams) -> Result<String> {
        let resp = self.deps.create_invoice(params).await.map_err(|e| {
            warn!("cannot create invoice: {}", e);
            e
        })?;
        info!(add_index = resp.add_index, r_hash = %hex::encode(&resp.r_hash), "invoice created");
        Ok(resp.payment_request)
    }

    /// GET /pay_invoice/<payment_request>
    pub async fn pay_invoice(&self, payment_request: &str) -> Result<String> {
        info!(%payment_request, "paying invoice");
        let resp = self.deps.pay_invoice(payment_request).await.map_err(|e| {
            warn!("cannot send payment: {}", e);
            e
        })?;
        if resp.payment_error.is_empty() {
            info!(payment_hash = %hex::encode(&resp.payment_hash), "payment settled");
        } else {
            warn!(payment_error = %resp.payment_error, "payment failed");
        }
        Ok(resp.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::BridgeError;

    struct Fixed;

    #[async_trait]
    impl RpcDeps for Fixed {
        async fn get_node_info(&self) -> Result<GetInfoResponse> {
            Ok(GetInfoResponse { identity_pubkey: "02abc".into(), ..Default::default() })
        }
        async fn create_invoice(&self, params: InvoiceParams) -> Result<AddInvoiceResponse> {
            let inv = params.into_invoice();
            Ok(AddInvoiceResponse {
                payment_request: format!("lnbc{}-{}", inv.value, inv.memo),
                ..Default::default()
            })
        }
        async fn pay_invoice(&self, _payment_request: &str) -> Result<SendResponse> {
            Err(BridgeError::RemoteCall("rpc error: code = Unknown desc = invoice expired".into()))
        }
    }

    #[tokio::test]
    async fn tip_formats_pubkey_and_url() {
        let h = RpcHandler::new(Arc::new(Fixed), DEFAULT_TIP_URL);
        assert_eq!(h.tip().await.unwrap(), "pubkey: 02abc, http://donnerlab.com/get_invoice/");
    }

    #[tokio::test]
    async fn invoice_params_are_threaded_through() {
        let h = RpcHandler::new(Arc::new(Fixed), DEFAULT_TIP_URL);
        assert_eq!(h.get_invoice(InvoiceParams::default()).await.unwrap(), "lnbc0-");
        let params = InvoiceParams { value: Some(21), memo: Some("coffee".into()) };
        assert_eq!(h.get_invoice(params).await.unwrap(), "lnbc21-coffee");
    }

    #[tokio::test]
    async fn pay_error_is_propagated() {
        let h = RpcHandler::new(Arc::new(Fixed), DEFAULT_TIP_URL);
        let err = h.pay_invoice("lnbc1").await.unwrap_err();
        assert_eq!(err.to_string(), "rpc error: code = Unknown desc = invoice expired");
    }

    #[test]
    fn default_params_build_empty_invoice() {
        assert_eq!(InvoiceParams::default().into_invoice(), Invoice::default());
    }
}
