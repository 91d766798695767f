//! Web interface configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Certificate and key for serving over HTTPS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct WebConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding the GUI's static assets.
    pub static_dir: PathBuf,
    pub disable_csrf: bool,
    /// Serve over HTTPS when set.
    pub tls: Option<TlsConfig>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7620)),
            static_dir: PathBuf::from("./src/gui/static/"),
            disable_csrf: false,
            tls: None,
        }
    }
}

impl WebConfig {
    pub fn scheme(&self) -> &'static str {
        if self.tls.is_some() {
            "https"
        } else {
            "http"
        }
    }
}
