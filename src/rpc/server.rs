use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::rpc::handlers::{InvoiceParams, RpcDeps, RpcHandler};
use crate::utils::{BridgeError, Result};

pub const PAY_INVOICE_PREFIX: &str = "/pay_invoice/";

/// HTTP status used when a node call fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStatus {
    /// Always 200; the failure is only visible in the body.
    #[default]
    Compat,
    /// 502 for daemon errors, 504 for expired deadlines.
    Gateway,
}

impl ErrorStatus {
    pub fn status_for(self, err: &BridgeError) -> StatusCode {
        match (self, err) {
            (ErrorStatus::Compat, _) => StatusCode::OK,
            (ErrorStatus::Gateway, BridgeError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            (ErrorStatus::Gateway, BridgeError::RemoteCall(_)) => StatusCode::BAD_GATEWAY,
            (ErrorStatus::Gateway, _) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Everything after `/pay_invoice/` exactly as it appeared on the wire:
/// no percent-decoding, no trimming. `Path` would decode, so the route's
/// wildcard only selects the handler and this reads the raw URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPaymentRequest(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RawPaymentRequest {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        parts
            .uri
            .path()
            .strip_prefix(PAY_INVOICE_PREFIX)
            .filter(|rest| !rest.is_empty())
            .map(|rest| RawPaymentRequest(rest.to_string()))
            .ok_or(StatusCode::NOT_FOUND)
    }
}

struct AppState<D: RpcDeps> {
    handler: Arc<RpcHandler<D>>,
    error_status: ErrorStatus,
}

impl<D: RpcDeps> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self { handler: self.handler.clone(), error_status: self.error_status }
    }
}

impl<D: RpcDeps> AppState<D> {
    fn respond(&self, res: Result<String>) -> Response {
        match res {
            Ok(body) => (StatusCode::OK, body).into_response(),
            Err(e) => (self.error_status.status_for(&e), e.to_string()).into_response(),
        }
    }
}

async fn tip<D: RpcDeps>(State(st): State<AppState<D>>) -> Response {
    st.respond(st.handler.tip().await)
}

async fn get_invoice<D: RpcDeps>(
    State(st): State<AppState<D>>,
    Query(params): Query<InvoiceParams>,
) -> Response {
    st.respond(st.handler.get_invoice(params).await)
}

async fn pay_invoice<D: RpcDeps>(
    State(st): State<AppState<D>>,
    RawPaymentRequest(payment_request): RawPaymentRequest,
) -> Response {
    st.respond(st.handler.pay_invoice(&payment_request).await)
}

/// Build the bridge's routes around an injected handler.
pub fn router<D: RpcDeps>(handler: Arc<RpcHandler<D>>, error_status: ErrorStatus) -> Router {
    let state = AppState { handler, error_status };
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/tip", get(tip::<D>))
        .route("/get_invoice", get(get_invoice::<D>))
        .route("/pay_invoice/*payment_request", get(pay_invoice::<D>))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// RpcServer ties together the HTTP listener and the handler.
pub struct RpcServer {
    listener: TcpListener,
    app: Router,
}

impl RpcServer {
    /// Bind the listener. Nothing is served until `serve`.
    pub async fn bind<D: RpcDeps>(
        addr: SocketAddr,
        handler: Arc<RpcHandler<D>>,
        error_status: ErrorStatus,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, app: router(handler, error_status) })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` flips to true.
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        info!("Starting HTTP server on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|stop| *stop).await;
            })
            .await?;
        info!("HTTP server stopped");
        Ok(())
    }
}
