//! Client for the `lnrpc.Lightning` service, in the shape tonic-build emits.
//!
//! Only the three unary methods the bridge calls are present. Kept in-tree
//! so building does not need `protoc`.

use tonic::codegen::*;

use crate::lnrpc::types::{
    AddInvoiceResponse, GetInfoRequest, GetInfoResponse, Invoice, SendRequest, SendResponse,
};

const SERVICE: &str = "lnrpc.Lightning";

#[derive(Debug, Clone)]
pub struct LightningClient<T> {
    inner: tonic::client::Grpc<T>,
}

impl<T> LightningClient<T>
where
    T: tonic::client::GrpcService<tonic::body::BoxBody>,
    T::Error: Into<StdError>,
    T::ResponseBody: Body<Data = Bytes> + Send + 'static,
    <T::ResponseBody as Body>::Error: Into<StdError> + Send,
{
    pub fn new(inner: T) -> Self {
        let inner = tonic::client::Grpc::new(inner);
        Self { inner }
    }

    async fn ready(&mut self) -> std::result::Result<(), tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into()))
        })
    }

    /// GetInfo returns general information concerning the lightning node.
    pub async fn get_info(
        &mut self,
        request: impl tonic::IntoRequest<GetInfoRequest>,
    ) -> std::result::Result<tonic::Response<GetInfoResponse>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/lnrpc.Lightning/GetInfo");
        let mut req = request.into_request();
        req.extensions_mut().insert(tonic::GrpcMethod::new(SERVICE, "GetInfo"));
        self.inner.unary(req, path, codec).await
    }

    /// AddInvoice attempts to add a new invoice to the invoice database.
    pub async fn add_invoice(
        &mut self,
        request: impl tonic::IntoRequest<Invoice>,
    ) -> std::result::Result<tonic::Response<AddInvoiceResponse>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/lnrpc.Lightning/AddInvoice");
        let mut req = request.into_request();
        req.extensions_mut().insert(tonic::GrpcMethod::new(SERVICE, "AddInvoice"));
        self.inner.unary(req, path, codec).await
    }

    /// SendPaymentSync is the synchronous non-streaming version of SendPayment.
    pub async fn send_payment_sync(
        &mut self,
        request: impl tonic::IntoRequest<SendRequest>,
    ) -> std::result::Result<tonic::Response<SendResponse>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/lnrpc.Lightning/SendPaymentSync");
        let mut req = request.into_request();
        req.extensions_mut().insert(tonic::GrpcMethod::new(SERVICE, "SendPaymentSync"));
        self.inner.unary(req, path, codec).await
    }
}
