use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::credentials::macaroon::Macaroon;
use crate::utils::{BridgeError, Result};

pub const TLS_CERT_FILE: &str = "tls.cert";
pub const MACAROON_FILE: &str = "admin.macaroon";

/// TLS trust anchor plus macaroon, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub tls_cert_pem: Vec<u8>,
    pub macaroon: Macaroon,
}

/// `<home>/.lnd`, the daemon's default data directory.
pub fn default_lnd_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".lnd"))
        .ok_or_else(|| BridgeError::Configuration("cannot resolve home directory".into()))
}

impl Credentials {
    /// Read `tls.cert` and `admin.macaroon` from `lnd_dir`.
    pub fn load(lnd_dir: impl AsRef<Path>) -> Result<Self> {
        let lnd_dir = lnd_dir.as_ref();
        let cert_path = lnd_dir.join(TLS_CERT_FILE);
        let mac_path = lnd_dir.join(MACAROON_FILE);

        let tls_cert_pem = read(&cert_path, "tls certificate")?;
        check_cert(&tls_cert_pem)
            .map_err(|e| BridgeError::Configuration(format!("invalid {}: {}", cert_path.display(), e)))?;

        let mac_bytes = read(&mac_path, "macaroon")?;
        let macaroon = Macaroon::from_binary(&mac_bytes).map_err(|e| {
            BridgeError::Configuration(format!("cannot decode {}: {}", mac_path.display(), e))
        })?;
        debug!(?macaroon, "macaroon decoded");

        info!("loaded lnd credentials from {}", lnd_dir.display());
        Ok(Self { tls_cert_pem, macaroon })
    }
}

/// Every PEM `CERTIFICATE` block must hold a well-formed X.509 certificate,
/// and there must be at least one.
fn check_cert(pem: &[u8]) -> std::result::Result<(), String> {
    let ders = rustls_pemfile::certs(&mut &pem[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("bad PEM: {}", e))?;
    if ders.is_empty() {
        return Err("no PEM certificate found".into());
    }
    for der in &ders {
        x509_parser::parse_x509_certificate(der.as_ref())
            .map_err(|e| format!("bad certificate: {}", e))?;
    }
    Ok(())
}

fn read(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path)
        .map_err(|e| BridgeError::Configuration(format!("cannot read {} {}: {}", what, path.display(), e)))
}
