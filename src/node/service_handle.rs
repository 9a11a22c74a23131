use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Holds the running tasks and the shutdown channel for the bridge.
/// Call `shutdown()` to stop serving gracefully.
pub struct ServiceHandle {
    shutdown_tx: watch::Sender<bool>,
    join_handles: Vec<JoinHandle<Result<()>>>,
}

impl ServiceHandle {
    /// Create a new ServiceHandle and return it together with a Receiver clonable by tasks.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        let handle = ServiceHandle { shutdown_tx: tx, join_handles: vec![] };
        (handle, rx)
    }

    pub fn attach(&mut self, h: JoinHandle<Result<()>>) {
        self.join_handles.push(h);
    }

    /// Signal shutdown, then wait for every task. The first task error is returned.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(true);

        let mut first_err = None;
        for h in self.join_handles {
            let res = match h.await {
                Ok(res) => res,
                Err(e) => Err(anyhow::anyhow!("task join error: {}", e)),
            };
            if let Err(e) = res {
                tracing::error!("service task returned error: {:?}", e);
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
