//! Read-only view of the running daemon for the RPC and web interfaces.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use serde::Serialize;
use suncoin_emission::EmissionPolicy;
use suncoin_types::Output;

use crate::peers::{Direction, PeerInfo, PeerRegistry};

/// Version information baked in at build time.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
}

/// Point-in-time status of the node.
#[derive(Clone, Debug, Serialize)]
pub struct NodeStatus {
    pub version: String,
    pub commit: String,
    pub uptime_secs: u64,
    pub networking: bool,
    pub listen_addr: Option<String>,
    pub inbound_peers: usize,
    pub outbound_peers: usize,
    pub db_path: String,
    pub schema_version: u32,
}

/// Shared entry point the interfaces use to query the node.
///
/// Later-started subsystems hold an `Arc<Gateway>`; they must stop before
/// the daemon that owns the underlying state is torn down.
pub struct Gateway {
    build: BuildInfo,
    started_at: Instant,
    networking: bool,
    peers: Arc<PeerRegistry>,
    listen_addr: OnceLock<SocketAddr>,
    db_path: PathBuf,
    schema_version: u32,
    policy: Arc<EmissionPolicy>,
}

impl Gateway {
    pub(crate) fn new(
        build: BuildInfo,
        networking: bool,
        peers: Arc<PeerRegistry>,
        db_path: PathBuf,
        schema_version: u32,
        policy: Arc<EmissionPolicy>,
    ) -> Self {
        Self {
            build,
            started_at: Instant::now(),
            networking,
            peers,
            listen_addr: OnceLock::new(),
            db_path,
            schema_version,
            policy,
        }
    }

    pub(crate) fn set_listen_addr(&self, addr: SocketAddr) {
        let _ = self.listen_addr.set(addr);
    }

    /// Address the listener is bound to, once it is up.
    pub fn listen_addr(&self) -> Option<SocketAddr> {
        self.listen_addr.get().copied()
    }

    pub fn build_info(&self) -> &BuildInfo {
        &self.build
    }

    pub fn status(&self) -> NodeStatus {
        NodeStatus {
            version: self.build.version.clone(),
            commit: self.build.commit.clone(),
            uptime_secs: self.started_at.elapsed().as_secs(),
            networking: self.networking,
            listen_addr: self.listen_addr().map(|a| a.to_string()),
            inbound_peers: self.peers.count(Direction::Inbound),
            outbound_peers: self.peers.count(Direction::Outbound),
            db_path: self.db_path.display().to_string(),
            schema_version: self.schema_version,
        }
    }

    pub fn peers(&self) -> Vec<PeerInfo> {
        self.peers.snapshot()
    }

    pub fn emission_policy(&self) -> &EmissionPolicy {
        &self.policy
    }

    /// Whether spending `outputs` is vetoed by the emission schedule.
    pub fn is_spend_locked(&self, outputs: &[Output]) -> bool {
        self.policy.is_transaction_locked(outputs)
    }
}
