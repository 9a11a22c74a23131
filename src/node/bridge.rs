//! Bridge orchestration: credentials, then the lnd channel, then HTTP.
//!
//! Each step must succeed before the next runs, so a missing file or an
//! unreachable daemon never leaves a half-started server behind.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::credentials::Credentials;
use crate::lnd::LndAdapter;
use crate::node::config::BridgeConfig;
use crate::node::service_handle::ServiceHandle;
use crate::rpc::{RpcHandler, RpcServer};

/// A started bridge.
pub struct RunningBridge {
    pub http_addr: SocketAddr,
    pub handle: ServiceHandle,
}

/// Main Bridge object
pub struct Bridge {
    cfg: BridgeConfig,
}

impl Bridge {
    pub fn new(cfg: BridgeConfig) -> Self {
        Self { cfg }
    }

    /// Load credentials and dial lnd. Used by `start` and by `check`.
    pub async fn connect(&self) -> Result<LndAdapter> {
        let creds = Credentials::load(&self.cfg.lnd_dir)?;
        let lnd = LndAdapter::connect(&self.cfg.lnd, &creds).await?;
        Ok(lnd)
    }

    /// Start the bridge: connect, bind, spawn the HTTP server.
    pub async fn start(self) -> Result<RunningBridge> {
        let lnd = Arc::new(self.connect().await?);
        let handler = Arc::new(RpcHandler::new(lnd, self.cfg.tip_url.clone()));

        let server = RpcServer::bind(self.cfg.listen, handler, self.cfg.error_status).await?;
        let http_addr = server.local_addr()?;

        let (mut handle, shutdown_rx) = ServiceHandle::new();
        let h: JoinHandle<Result<()>> = tokio::spawn(async move {
            if let Err(e) = server.serve(shutdown_rx).await {
                error!("HTTP server failed: {:?}", e);
                return Err(e);
            }
            Ok(())
        });
        handle.attach(h);

        info!("Bridge started, HTTP: {}, lnd: {}", http_addr, self.cfg.lnd.addr);
        Ok(RunningBridge { http_addr, handle })
    }
}
