//! Network daemon configuration.

use std::time::Duration;

/// Default P2P port.
pub const DEFAULT_PORT: u16 = 7200;

/// How the daemon listens and dials.
#[derive(Clone, Debug)]
pub struct DaemonConfig {
    /// Interface to listen on. Empty means all interfaces.
    pub address: String,
    pub port: u16,
    /// Run without any network activity at all.
    pub disable_networking: bool,
    pub disable_incoming: bool,
    pub disable_outgoing: bool,
    /// Listen on loopback and only dial loopback peers.
    pub localhost_only: bool,
    /// Maximum number of outbound connections to maintain.
    pub outgoing_max: usize,
    /// Interval between outbound connection attempts.
    pub outgoing_rate: Duration,
    /// Upper bound on tracked peers, inbound and outbound together.
    pub max_peers: usize,
    pub dial_timeout: Duration,
    /// Peers dialled in order until `outgoing_max` is reached.
    pub default_connections: Vec<String>,
    /// Debug only: dial this peer once as soon as the daemon runs.
    pub connect_to: Option<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: DEFAULT_PORT,
            disable_networking: false,
            disable_incoming: false,
            disable_outgoing: false,
            localhost_only: false,
            outgoing_max: 16,
            outgoing_rate: Duration::from_secs(5),
            max_peers: 65535,
            dial_timeout: Duration::from_secs(5),
            default_connections: Vec::new(),
            connect_to: None,
        }
    }
}
