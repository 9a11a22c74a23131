use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, info, warn};

use crate::credentials::Credentials;
use crate::lnd::interceptor::MacaroonInterceptor;
use crate::lnrpc::{
    AddInvoiceResponse, GetInfoRequest, GetInfoResponse, Invoice, LightningClient, SendRequest,
    SendResponse,
};
use crate::rpc::handlers::{InvoiceParams, RpcDeps};
use crate::utils::{BridgeError, Result};

/// Where and how patiently to talk to lnd.
#[derive(Clone, Debug)]
pub struct LndConfig {
    /// host:port of lnd's gRPC listener.
    pub addr: String,
    pub connect_timeout: Duration,
    /// Deadline applied to every remote call.
    pub rpc_timeout: Duration,
}

impl Default for LndConfig {
    fn default() -> Self {
        Self {
            addr: "localhost:10009".into(),
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: Duration::from_secs(30),
        }
    }
}

type AuthedClient = LightningClient<InterceptedService<Channel, MacaroonInterceptor>>;

/// One long-lived, macaroon-authenticated channel to lnd.
///
/// Cloning is cheap and every clone multiplexes over the same HTTP/2
/// connection, so handlers clone per call instead of locking.
#[derive(Clone)]
pub struct LndAdapter {
    client: AuthedClient,
    rpc_timeout: Duration,
}

impl LndAdapter {
    /// Dial lnd and wait for the connection to come up.
    pub async fn connect(cfg: &LndConfig, creds: &Credentials) -> Result<Self> {
        let interceptor = MacaroonInterceptor::new(&creds.macaroon)?;

        let uri = format!("https://{}", cfg.addr);
        let tls = ClientTlsConfig::new().ca_certificate(Certificate::from_pem(&creds.tls_cert_pem));
        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| dial_error(format!("invalid lnd address {}", cfg.addr), e))?
            .tls_config(tls)
            .map_err(|e| dial_error("tls setup failed".into(), e))?
            .connect_timeout(cfg.connect_timeout);

        info!("dialing lnd at {}", uri);
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| dial_error(format!("cannot dial lnd at {}", cfg.addr), e))?;
        info!("connected to lnd at {}", cfg.addr);

        Ok(Self {
            client: LightningClient::new(InterceptedService::new(channel, interceptor)),
            rpc_timeout: cfg.rpc_timeout,
        })
    }

    fn request<M>(&self, msg: M) -> tonic::Request<M> {
        let mut req = tonic::Request::new(msg);
        req.set_timeout(self.rpc_timeout);
        req
    }

    pub async fn get_info(&self) -> Result<GetInfoResponse> {
        let req = self.request(GetInfoRequest {});
        let mut client = self.client.clone();
        let resp = with_deadline("GetInfo", self.rpc_timeout, client.get_info(req)).await?;
        debug!(?resp, "GetInfo");
        Ok(resp)
    }

    pub async fn add_invoice(&self, invoice: Invoice) -> Result<AddInvoiceResponse> {
        let req = self.request(invoice);
        let mut client = self.client.clone();
        let resp = with_deadline("AddInvoice", self.rpc_timeout, client.add_invoice(req)).await?;
        debug!(?resp, "AddInvoice");
        Ok(resp)
    }

    /// `payment_request` goes out exactly as given; lnd does the validation.
    pub async fn send_payment_sync(&self, payment_request: &str) -> Result<SendResponse> {
        let req = self.request(SendRequest {
            payment_request: payment_request.to_string(),
            ..Default::default()
        });
        let mut client = self.client.clone();
        let resp =
            with_deadline("SendPaymentSync", self.rpc_timeout, client.send_payment_sync(req)).await?;
        debug!(?resp, "SendPaymentSync");
        Ok(resp)
    }
}

/// Connection error with the full source chain of `e` after `context`.
fn dial_error(context: String, e: tonic::transport::Error) -> BridgeError {
    BridgeError::Connection(format!("{}: {:#}", context, anyhow::Error::from(e)))
}

/// Run one remote call under `rpc_timeout`.
async fn with_deadline<T, F>(method: &'static str, rpc_timeout: Duration, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<tonic::Response<T>, tonic::Status>>,
{
    match tokio::time::timeout(rpc_timeout, call).await {
        Ok(Ok(resp)) => Ok(resp.into_inner()),
        Ok(Err(status)) if status.code() == tonic::Code::DeadlineExceeded => {
            warn!("{} exceeded deadline on the daemon side", method);
            Err(BridgeError::Timeout(rpc_timeout))
        }
        Ok(Err(status)) => {
            warn!("{} failed: {}", method, status);
            Err(BridgeError::from_status(&status))
        }
        Err(_) => {
            warn!("{} timed out after {:?}", method, rpc_timeout);
            Err(BridgeError::Timeout(rpc_timeout))
        }
    }
}

#[async_trait]
impl RpcDeps for LndAdapter {
    async fn get_node_info(&self) -> Result<GetInfoResponse> {
        self.get_info().await
    }

    async fn create_invoice(&self, params: InvoiceParams) -> Result<AddInvoiceResponse> {
        self.add_invoice(params.into_invoice()).await
    }

    async fn pay_invoice(&self, payment_request: &str) -> Result<SendResponse> {
        self.send_payment_sync(payment_request).await
    }
}
