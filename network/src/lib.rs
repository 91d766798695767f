//! P2P network daemon for the Suncoin node.
//!
//! The daemon owns the listener, the outbound dialer and the peer
//! registry. The wire protocol itself lives elsewhere; this crate only
//! keeps connections alive and exposes a read-only [`Gateway`] that the
//! RPC and web interfaces query.

pub mod config;
pub mod daemon;
pub mod error;
pub mod gateway;
pub mod peers;

pub use config::DaemonConfig;
pub use daemon::Daemon;
pub use error::NetworkError;
pub use gateway::{BuildInfo, Gateway, NodeStatus};
pub use peers::{Direction, PeerInfo, PeerRegistry};
