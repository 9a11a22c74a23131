use clap::Args;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credentials::default_lnd_dir;
use crate::lnd::LndConfig;
use crate::rpc::{ErrorStatus, DEFAULT_TIP_URL};
use crate::utils::{BridgeError, Result};

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";

/// Settings that can come from the TOML file or the command line.
/// Every field is optional; unset ones fall back to defaults in `resolve`.
#[derive(Args, Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeOptions {
    /// lnd data directory holding tls.cert and admin.macaroon [default: ~/.lnd]
    #[arg(long)]
    pub lnd_dir: Option<PathBuf>,

    /// lnd gRPC address (host:port) [default: localhost:10009]
    #[arg(long)]
    pub lnd_addr: Option<String>,

    /// HTTP bind address (host:port) [default: 0.0.0.0:8000]
    #[arg(long)]
    pub listen: Option<String>,

    /// URL appended to the /tip answer
    #[arg(long)]
    pub tip_url: Option<String>,

    /// Deadline for each call to lnd, in seconds [default: 30]
    #[arg(long)]
    pub rpc_timeout_secs: Option<u64>,

    /// Deadline for the initial dial, in seconds [default: 10]
    #[arg(long)]
    pub connect_timeout_secs: Option<u64>,

    /// HTTP status on failed node calls [default: compat]
    #[arg(long, value_enum)]
    pub error_status: Option<ErrorStatus>,
}

impl BridgeOptions {
    /// Load options from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| BridgeError::Configuration(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&data)
            .map_err(|e| BridgeError::Configuration(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Fields set in `over` win.
    pub fn merge(self, over: BridgeOptions) -> Self {
        Self {
            lnd_dir: over.lnd_dir.or(self.lnd_dir),
            lnd_addr: over.lnd_addr.or(self.lnd_addr),
            listen: over.listen.or(self.listen),
            tip_url: over.tip_url.or(self.tip_url),
            rpc_timeout_secs: over.rpc_timeout_secs.or(self.rpc_timeout_secs),
            connect_timeout_secs: over.connect_timeout_secs.or(self.connect_timeout_secs),
            error_status: over.error_status.or(self.error_status),
        }
    }

    pub fn resolve(self) -> Result<BridgeConfig> {
        let lnd_dir = match self.lnd_dir {
            Some(dir) => dir,
            None => default_lnd_dir()?,
        };

        let listen_str = self.listen.unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_str
            .parse()
            .map_err(|e| BridgeError::Configuration(format!("invalid listen address {}: {}", listen_str, e)))?;

        let mut lnd = LndConfig::default();
        if let Some(addr) = self.lnd_addr {
            lnd.addr = addr;
        }
        if let Some(secs) = self.rpc_timeout_secs {
            lnd.rpc_timeout = non_zero_secs("rpc_timeout_secs", secs)?;
        }
        if let Some(secs) = self.connect_timeout_secs {
            lnd.connect_timeout = non_zero_secs("connect_timeout_secs", secs)?;
        }

        Ok(BridgeConfig {
            lnd_dir,
            lnd,
            listen,
            tip_url: self.tip_url.unwrap_or_else(|| DEFAULT_TIP_URL.to_string()),
            error_status: self.error_status.unwrap_or_default(),
        })
    }
}

fn non_zero_secs(name: &str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(BridgeError::Configuration(format!("{} must be greater than zero", name)));
    }
    Ok(Duration::from_secs(secs))
}

/// Fully resolved settings the bridge runs with.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    pub lnd_dir: PathBuf,
    pub lnd: LndConfig,
    pub listen: SocketAddr,
    pub tip_url: String,
    pub error_status: ErrorStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_dir() -> BridgeOptions {
        BridgeOptions { lnd_dir: Some("/tmp/lnd".into()), ..Default::default() }
    }

    #[test]
    fn defaults() {
        let cfg = with_dir().resolve().unwrap();
        assert_eq!(cfg.listen, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.lnd.addr, "localhost:10009");
        assert_eq!(cfg.lnd.rpc_timeout, Duration::from_secs(30));
        assert_eq!(cfg.tip_url, DEFAULT_TIP_URL);
        assert_eq!(cfg.error_status, ErrorStatus::Compat);
    }

    #[test]
    fn cli_overrides_file() {
        let file = BridgeOptions {
            lnd_addr: Some("10.0.0.2:10009".into()),
            listen: Some("127.0.0.1:9000".into()),
            ..with_dir()
        };
        let cli = BridgeOptions { listen: Some("127.0.0.1:9100".into()), ..Default::default() };
        let cfg = file.merge(cli).resolve().unwrap();
        assert_eq!(cfg.lnd.addr, "10.0.0.2:10009");
        assert_eq!(cfg.listen.port(), 9100);
        assert_eq!(cfg.lnd_dir, PathBuf::from("/tmp/lnd"));
    }

    #[test]
    fn bad_values_are_configuration_errors() {
        let opts = BridgeOptions { listen: Some("nope".into()), ..with_dir() };
        assert!(matches!(opts.resolve(), Err(BridgeError::Configuration(_))));

        let opts = BridgeOptions { rpc_timeout_secs: Some(0), ..with_dir() };
        assert!(matches!(opts.resolve(), Err(BridgeError::Configuration(_))));
    }

    #[test]
    fn loads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tipbridge.toml");
        fs::write(
            &path,
            "lnd_dir = \"/srv/lnd\"\nerror_status = \"gateway\"\nrpc_timeout_secs = 5\n",
        )
        .unwrap();
        let opts = BridgeOptions::load(&path).unwrap();
        assert_eq!(opts.error_status, Some(ErrorStatus::Gateway));
        let cfg = opts.resolve().unwrap();
        assert_eq!(cfg.lnd.rpc_timeout, Duration::from_secs(5));
        assert_eq!(cfg.lnd_dir, PathBuf::from("/srv/lnd"));
    }

    #[test]
    fn unknown_toml_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tipbridge.toml");
        fs::write(&path, "lnd_port = 1\n").unwrap();
        assert!(matches!(BridgeOptions::load(&path), Err(BridgeError::Configuration(_))));
    }
}
