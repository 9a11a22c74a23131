use std::time::Duration;
use thiserror::Error;

/// Unified error type for the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Credential files missing, unreadable or malformed. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Dial or TLS setup towards lnd failed. Fatal at startup.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The daemon answered a call with an error status. Rendered verbatim.
    #[error("{0}")]
    RemoteCall(String),

    #[error("rpc error: deadline of {0:?} exceeded")]
    Timeout(Duration),
}

impl BridgeError {
    /// Build a RemoteCall error with the same text grpc-go gives a status.
    pub fn from_status(status: &tonic::Status) -> Self {
        BridgeError::RemoteCall(format!(
            "rpc error: code = {:?} desc = {}",
            status.code(),
            status.message()
        ))
    }

    /// True for failures that happen before the HTTP port is bound.
    pub fn is_startup(&self) -> bool {
        matches!(self, BridgeError::Configuration(_) | BridgeError::Connection(_))
    }
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_call_text_matches_grpc_go() {
        let status = tonic::Status::new(tonic::Code::Unavailable, "wallet locked");
        let err = BridgeError::from_status(&status);
        assert_eq!(err.to_string(), "rpc error: code = Unavailable desc = wallet locked");
        assert!(!err.is_startup());
    }

    #[test]
    fn startup_classification() {
        assert!(BridgeError::Configuration("x".into()).is_startup());
        assert!(BridgeError::Connection("x".into()).is_startup());
        assert!(!BridgeError::Timeout(Duration::from_secs(1)).is_startup());
    }
}
