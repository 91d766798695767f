//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use suncoin_network::DaemonConfig;
use suncoin_rpc::RpcConfig;
use suncoin_types::{params, NetworkParams};
use suncoin_web::{TlsConfig, WebConfig};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a Suncoin node.
///
/// Loaded from a TOML file via [`NodeConfig::from_toml_file`], overridden by
/// command-line flags, or built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the database, certificates and app state.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Database location. Defaults to `<data_dir>/data.db`.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    // ── Networking ─────────────────────────────────────────────────────
    /// Interface to listen on. Empty picks all interfaces.
    #[serde(default)]
    pub address: String,

    /// Port to listen on for P2P connections.
    #[serde(default = "default_p2p_port")]
    pub port: u16,

    #[serde(default)]
    pub disable_networking: bool,

    #[serde(default)]
    pub disable_incoming: bool,

    #[serde(default)]
    pub disable_outgoing: bool,

    /// Only listen on and connect to localhost.
    #[serde(default)]
    pub localhost_only: bool,

    #[serde(default = "default_outgoing_max")]
    pub outgoing_max: usize,

    /// Seconds between outbound connection attempts.
    #[serde(default = "default_outgoing_rate_secs")]
    pub outgoing_rate_secs: u64,

    #[serde(default = "default_max_peers")]
    pub max_peers: usize,

    /// Peers to dial. Empty uses the network's default connections.
    #[serde(default)]
    pub default_connections: Vec<String>,

    /// Force a connection to this `ip:port` on startup.
    #[serde(default)]
    pub connect_to: Option<String>,

    // ── RPC ────────────────────────────────────────────────────────────
    #[serde(default = "default_true")]
    pub enable_rpc: bool,

    #[serde(default = "default_localhost")]
    pub rpc_addr: String,

    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Number of RPC worker tasks.
    #[serde(default = "default_rpc_threads")]
    pub rpc_threads: usize,

    #[serde(default = "default_rpc_queue_depth")]
    pub rpc_queue_depth: usize,

    // ── Web interface ──────────────────────────────────────────────────
    #[serde(default = "default_true")]
    pub enable_web: bool,

    #[serde(default = "default_localhost")]
    pub web_addr: String,

    #[serde(default = "default_web_port")]
    pub web_port: u16,

    #[serde(default)]
    pub web_https: bool,

    /// TLS certificate. Defaults to `<data_dir>/cert.pem`.
    #[serde(default)]
    pub web_cert: Option<PathBuf>,

    /// TLS key. Defaults to `<data_dir>/key.pem`.
    #[serde(default)]
    pub web_key: Option<PathBuf>,

    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    #[serde(default)]
    pub disable_csrf: bool,

    /// Print the web interface address to stdout at startup.
    #[serde(default)]
    pub print_web_interface_address: bool,

    // ── Chain identity ─────────────────────────────────────────────────
    #[serde(default)]
    pub genesis_address: Option<String>,

    #[serde(default)]
    pub genesis_signature: Option<String>,

    #[serde(default)]
    pub genesis_timestamp: Option<u64>,

    #[serde(default)]
    pub blockchain_pubkey: Option<String>,

    /// Only set on a master node.
    #[serde(default, skip_serializing)]
    pub blockchain_seckey: Option<String>,

    // ── Logging ────────────────────────────────────────────────────────
    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from(".suncoin")
}

fn default_p2p_port() -> u16 {
    suncoin_network::config::DEFAULT_PORT
}

fn default_outgoing_max() -> usize {
    16
}

fn default_outgoing_rate_secs() -> u64 {
    5
}

fn default_max_peers() -> usize {
    65535
}

fn default_true() -> bool {
    true
}

fn default_localhost() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    7630
}

fn default_rpc_threads() -> usize {
    5
}

fn default_rpc_queue_depth() -> usize {
    1000
}

fn default_web_port() -> u16 {
    7620
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./src/gui/static/")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("data.db"))
    }

    pub fn cert_path(&self) -> PathBuf {
        self.web_cert
            .clone()
            .unwrap_or_else(|| self.data_dir.join("cert.pem"))
    }

    pub fn key_path(&self) -> PathBuf {
        self.web_key
            .clone()
            .unwrap_or_else(|| self.data_dir.join("key.pem"))
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    /// Mainnet parameters with any chain-identity overrides applied.
    pub fn network_params(&self) -> Result<NetworkParams, NodeError> {
        let params = NetworkParams::from_hex(
            self.genesis_address
                .as_deref()
                .unwrap_or(params::GENESIS_ADDRESS),
            self.genesis_signature
                .as_deref()
                .unwrap_or(params::GENESIS_SIGNATURE),
            self.blockchain_pubkey
                .as_deref()
                .unwrap_or(params::BLOCKCHAIN_PUBKEY),
            self.blockchain_seckey.as_deref(),
            self.genesis_timestamp.unwrap_or(params::GENESIS_TIMESTAMP),
        )?;
        Ok(params)
    }

    pub fn daemon_config(&self, network: &NetworkParams) -> DaemonConfig {
        let default_connections = if self.default_connections.is_empty() {
            network.default_connections.clone()
        } else {
            self.default_connections.clone()
        };
        DaemonConfig {
            address: self.address.clone(),
            port: self.port,
            disable_networking: self.disable_networking,
            disable_incoming: self.disable_incoming,
            disable_outgoing: self.disable_outgoing,
            localhost_only: self.localhost_only,
            outgoing_max: self.outgoing_max,
            outgoing_rate: Duration::from_secs(self.outgoing_rate_secs),
            max_peers: self.max_peers,
            default_connections,
            connect_to: self.connect_to.clone().filter(|s| !s.is_empty()),
            ..DaemonConfig::default()
        }
    }

    pub fn rpc_config(&self) -> Result<RpcConfig, NodeError> {
        Ok(RpcConfig {
            bind_addr: socket_addr("rpc_addr", &self.rpc_addr, self.rpc_port)?,
            worker_num: self.rpc_threads,
            queue_depth: self.rpc_queue_depth,
        })
    }

    pub fn web_config(&self) -> Result<WebConfig, NodeError> {
        let tls = self.web_https.then(|| TlsConfig {
            cert_path: self.cert_path(),
            key_path: self.key_path(),
        });
        Ok(WebConfig {
            bind_addr: socket_addr("web_addr", &self.web_addr, self.web_port)?,
            static_dir: self.static_dir.clone(),
            disable_csrf: self.disable_csrf,
            tls,
        })
    }
}

fn socket_addr(field: &'static str, host: &str, port: u16) -> Result<SocketAddr, NodeError> {
    let ip: IpAddr = host.parse().map_err(|_| NodeError::InvalidAddress {
        field,
        value: host.to_string(),
    })?;
    Ok(SocketAddr::new(ip, port))
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_path: None,
            address: String::new(),
            port: default_p2p_port(),
            disable_networking: false,
            disable_incoming: false,
            disable_outgoing: false,
            localhost_only: false,
            outgoing_max: default_outgoing_max(),
            outgoing_rate_secs: default_outgoing_rate_secs(),
            max_peers: default_max_peers(),
            default_connections: Vec::new(),
            connect_to: None,
            enable_rpc: default_true(),
            rpc_addr: default_localhost(),
            rpc_port: default_rpc_port(),
            rpc_threads: default_rpc_threads(),
            rpc_queue_depth: default_rpc_queue_depth(),
            enable_web: default_true(),
            web_addr: default_localhost(),
            web_port: default_web_port(),
            web_https: false,
            web_cert: None,
            web_key: None,
            static_dir: default_static_dir(),
            disable_csrf: false,
            print_web_interface_address: false,
            genesis_address: None,
            genesis_signature: None,
            genesis_timestamp: None,
            blockchain_pubkey: None,
            blockchain_seckey: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().expect("serializable");
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rpc_port, config.rpc_port);
        assert_eq!(parsed.web_port, config.web_port);
        assert_eq!(parsed.max_peers, config.max_peers);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.port, 7200);
        assert_eq!(config.rpc_port, 7630);
        assert_eq!(config.web_port, 7620);
        assert_eq!(config.rpc_threads, 5);
        assert_eq!(config.log_format, "human");
        assert!(config.enable_rpc && config.enable_web);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rpc_port = 9999
            outgoing_max = 4
            localhost_only = true
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.rpc_port, 9999);
        assert_eq!(config.outgoing_max, 4);
        assert!(config.localhost_only);
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suncoin.toml");
        std::fs::write(&path, "web_port = 8620\ndisable_csrf = true\n").unwrap();

        let config = NodeConfig::from_toml_file(&path).expect("should load");
        assert_eq!(config.web_port, 8620);
        assert!(config.disable_csrf);
        assert_eq!(config.rpc_port, 7630);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/suncoin.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn paths_default_under_data_dir() {
        let config = NodeConfig {
            data_dir: PathBuf::from("/var/lib/suncoin"),
            ..NodeConfig::default()
        };
        assert_eq!(config.resolved_db_path(), PathBuf::from("/var/lib/suncoin/data.db"));
        assert_eq!(config.cert_path(), PathBuf::from("/var/lib/suncoin/cert.pem"));
        assert_eq!(config.key_path(), PathBuf::from("/var/lib/suncoin/key.pem"));

        let explicit = NodeConfig {
            db_path: Some(PathBuf::from("/tmp/db")),
            ..config
        };
        assert_eq!(explicit.resolved_db_path(), PathBuf::from("/tmp/db"));
    }

    #[test]
    fn https_wires_tls_paths_into_web_config() {
        let config = NodeConfig {
            data_dir: PathBuf::from("/data"),
            web_https: true,
            ..NodeConfig::default()
        };
        let web = config.web_config().unwrap();
        let tls = web.tls.expect("tls configured");
        assert_eq!(tls.cert_path, PathBuf::from("/data/cert.pem"));
        assert_eq!(web.bind_addr, "127.0.0.1:7620".parse().unwrap());
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let config = NodeConfig {
            rpc_addr: "localhost:oops".into(),
            ..NodeConfig::default()
        };
        assert!(matches!(
            config.rpc_config(),
            Err(NodeError::InvalidAddress { field: "rpc_addr", .. })
        ));
    }

    #[test]
    fn empty_peer_list_falls_back_to_network_defaults() {
        let network = NetworkParams::mainnet().unwrap();
        let daemon = NodeConfig::default().daemon_config(&network);
        assert_eq!(daemon.default_connections, network.default_connections);
        assert_eq!(daemon.outgoing_rate, Duration::from_secs(5));

        let custom = NodeConfig {
            default_connections: vec!["127.0.0.1:7201".into()],
            ..NodeConfig::default()
        };
        assert_eq!(custom.daemon_config(&network).default_connections, vec!["127.0.0.1:7201"]);
    }

    #[test]
    fn chain_identity_defaults_to_mainnet() {
        let params = NodeConfig::default().network_params().unwrap();
        assert_eq!(params, NetworkParams::mainnet().unwrap());
        assert!(!params.is_master());
    }
}
