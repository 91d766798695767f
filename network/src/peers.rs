//! Registry of live and pending peer connections.
//!
//! Shared between the accept loop, the dialer and connection tasks, and
//! read by the gateway for status reporting.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Instant;

use serde::Serialize;

/// Which side opened the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Snapshot of one registry entry.
#[derive(Clone, Debug, Serialize)]
pub struct PeerInfo {
    pub addr: SocketAddr,
    pub direction: Direction,
    /// `false` while an outbound dial is still in progress.
    pub connected: bool,
    pub age_secs: u64,
}

struct Entry {
    direction: Direction,
    connected: bool,
    since: Instant,
}

/// Thread-safe peer table keyed by socket address.
pub struct PeerRegistry {
    peers: Mutex<HashMap<SocketAddr, Entry>>,
    max_peers: usize,
}

impl PeerRegistry {
    pub fn new(max_peers: usize) -> Self {
        Self {
            peers: Mutex::new(HashMap::new()),
            max_peers,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SocketAddr, Entry>> {
        // A panic while holding the lock cannot leave the map inconsistent.
        self.peers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reserve a slot for `addr`. Returns `false` if the address is
    /// already tracked or the registry is full.
    pub fn reserve(&self, addr: SocketAddr, direction: Direction) -> bool {
        let mut peers = self.lock();
        if peers.len() >= self.max_peers || peers.contains_key(&addr) {
            return false;
        }
        peers.insert(
            addr,
            Entry {
                direction,
                connected: direction == Direction::Inbound,
                since: Instant::now(),
            },
        );
        true
    }

    /// Mark a reserved outbound slot as connected.
    pub fn mark_connected(&self, addr: &SocketAddr) {
        if let Some(entry) = self.lock().get_mut(addr) {
            entry.connected = true;
            entry.since = Instant::now();
        }
    }

    pub fn remove(&self, addr: &SocketAddr) -> bool {
        self.lock().remove(addr).is_some()
    }

    pub fn contains(&self, addr: &SocketAddr) -> bool {
        self.lock().contains_key(addr)
    }

    /// Entries in `direction`, pending dials included.
    pub fn count(&self, direction: Direction) -> usize {
        self.lock()
            .values()
            .filter(|e| e.direction == direction)
            .count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn snapshot(&self) -> Vec<PeerInfo> {
        let mut out: Vec<PeerInfo> = self
            .lock()
            .iter()
            .map(|(addr, e)| PeerInfo {
                addr: *addr,
                direction: e.direction,
                connected: e.connected,
                age_secs: e.since.elapsed().as_secs(),
            })
            .collect();
        out.sort_by_key(|p| p.addr);
        out
    }
}
