//! The network daemon: listener, outbound dialer and connection tasks.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use suncoin_emission::EmissionPolicy;
use suncoin_store_lmdb::LmdbEnvironment;
use suncoin_utils::{ShutdownSignal, Subsystem, SubsystemError};

use crate::config::DaemonConfig;
use crate::error::NetworkError;
use crate::gateway::{BuildInfo, Gateway};
use crate::peers::{Direction, PeerRegistry};

const NAME: &str = "daemon";

/// Read buffer for draining peer streams.
const READ_BUF_SIZE: usize = 4096;

/// The P2P network daemon.
pub struct Daemon {
    config: DaemonConfig,
    listen_addr: SocketAddr,
    dial_list: Vec<SocketAddr>,
    connect_to: Option<SocketAddr>,
    outgoing_rate: Duration,
    peers: Arc<PeerRegistry>,
    gateway: Arc<Gateway>,
    stop: ShutdownSignal,
    // Held so the ledger outlives every connection task.
    _db: Arc<LmdbEnvironment>,
}

impl Daemon {
    /// Validate `config` and build the daemon. Nothing is bound until `run`.
    pub fn new(
        config: DaemonConfig,
        db: Arc<LmdbEnvironment>,
        policy: Arc<EmissionPolicy>,
        build: BuildInfo,
    ) -> Result<Self, NetworkError> {
        let ip: IpAddr = if config.localhost_only {
            Ipv4Addr::LOCALHOST.into()
        } else if config.address.is_empty() {
            Ipv4Addr::UNSPECIFIED.into()
        } else {
            config
                .address
                .parse()
                .map_err(|_| NetworkError::InvalidListenAddress(config.address.clone()))?
        };
        let listen_addr = SocketAddr::new(ip, config.port);

        let mut dial_list = Vec::with_capacity(config.default_connections.len());
        for peer in &config.default_connections {
            let addr = parse_peer(peer)?;
            if config.localhost_only && !addr.ip().is_loopback() {
                tracing::debug!(%addr, "localhost-only: skipping remote default peer");
                continue;
            }
            if !dial_list.contains(&addr) {
                dial_list.push(addr);
            }
        }

        let connect_to = config.connect_to.as_deref().map(parse_peer).transpose()?;

        let dialing = !config.disable_networking && !config.disable_outgoing;
        if dialing && config.outgoing_max == 0 && !dial_list.is_empty() {
            return Err(NetworkError::NoOutgoingSlots);
        }

        let outgoing_rate = if config.outgoing_rate.is_zero() {
            Duration::from_millis(1)
        } else {
            config.outgoing_rate
        };

        let peers = Arc::new(PeerRegistry::new(config.max_peers));
        let gateway = Arc::new(Gateway::new(
            build,
            !config.disable_networking,
            Arc::clone(&peers),
            db.path().to_path_buf(),
            db.schema_version(),
            policy,
        ));

        Ok(Self {
            config,
            listen_addr,
            dial_list,
            connect_to,
            outgoing_rate,
            peers,
            gateway,
            stop: ShutdownSignal::new(),
            _db: db,
        })
    }

    /// Gateway handed to the RPC and web interfaces.
    pub fn gateway(&self) -> Arc<Gateway> {
        Arc::clone(&self.gateway)
    }

    /// Peers the dialer cycles through.
    pub fn dial_list(&self) -> &[SocketAddr] {
        &self.dial_list
    }

    fn dial_next(&self, cursor: &mut usize, conns: &mut JoinSet<()>) {
        if self.dial_list.is_empty() || self.peers.count(Direction::Outbound) >= self.config.outgoing_max
        {
            return;
        }
        for step in 0..self.dial_list.len() {
            let idx = (*cursor + step) % self.dial_list.len();
            let addr = self.dial_list[idx];
            if self.peers.reserve(addr, Direction::Outbound) {
                *cursor = idx + 1;
                conns.spawn(dial(addr, self.config.dial_timeout, Arc::clone(&self.peers)));
                return;
            }
        }
    }
}

fn parse_peer(peer: &str) -> Result<SocketAddr, NetworkError> {
    peer.parse()
        .map_err(|_| NetworkError::InvalidPeerAddress(peer.to_string()))
}

async fn accept_next(listener: Option<&TcpListener>) -> std::io::Result<(TcpStream, SocketAddr)> {
    match listener {
        Some(listener) => listener.accept().await,
        None => std::future::pending().await,
    }
}

async fn connect(addr: SocketAddr, timeout: Duration) -> std::io::Result<TcpStream> {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(result) => result,
        Err(_) => Err(std::io::ErrorKind::TimedOut.into()),
    }
}

async fn dial(addr: SocketAddr, timeout: Duration, peers: Arc<PeerRegistry>) {
    match connect(addr, timeout).await {
        Ok(stream) => {
            peers.mark_connected(&addr);
            tracing::info!(%addr, "connected to peer");
            drain(stream, addr, peers).await;
        }
        Err(e) => {
            tracing::debug!(%addr, error = %e, "outbound connection failed");
            peers.remove(&addr);
        }
    }
}

/// Hold a peer connection open until the remote closes it.
async fn drain(mut stream: TcpStream, addr: SocketAddr, peers: Arc<PeerRegistry>) {
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            // Message decoding belongs to the protocol layer.
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(%addr, error = %e, "peer read failed");
                break;
            }
        }
    }
    peers.remove(&addr);
    tracing::debug!(%addr, "peer disconnected");
}

#[async_trait]
impl Subsystem for Daemon {
    fn name(&self) -> &str {
        NAME
    }

    async fn run(&self) -> Result<(), SubsystemError> {
        let mut stop = self.stop.subscribe();

        if self.config.disable_networking {
            tracing::info!("networking disabled");
            stop.wait().await;
            return Ok(());
        }

        let listener = if self.config.disable_incoming {
            None
        } else {
            let listener = TcpListener::bind(self.listen_addr).await.map_err(|e| {
                SubsystemError::new(NAME, format!("failed to listen on {}: {e}", self.listen_addr))
            })?;
            let local = listener
                .local_addr()
                .map_err(|e| SubsystemError::new(NAME, e))?;
            self.gateway.set_listen_addr(local);
            tracing::info!(addr = %local, "P2P listener started");
            Some(listener)
        };

        let mut conns = JoinSet::new();

        // A forced connection that cannot be made stops the daemon.
        if let Some(addr) = self.connect_to {
            if self.peers.reserve(addr, Direction::Outbound) {
                tracing::info!(%addr, "forcing connection");
                let connected = tokio::select! {
                    _ = stop.wait() => {
                        self.peers.remove(&addr);
                        return Ok(());
                    }
                    r = connect(addr, self.config.dial_timeout) => r,
                };
                match connected {
                    Ok(stream) => {
                        self.peers.mark_connected(&addr);
                        conns.spawn(drain(stream, addr, Arc::clone(&self.peers)));
                    }
                    Err(e) => {
                        self.peers.remove(&addr);
                        tracing::error!(%addr, error = %e, "forced connection failed");
                        return Err(SubsystemError::new(
                            NAME,
                            format!("failed to connect to {addr}: {e}"),
                        ));
                    }
                }
            }
        }

        let dialing = !self.config.disable_outgoing;
        let mut dial_tick = tokio::time::interval(self.outgoing_rate);
        dial_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut cursor = 0usize;

        loop {
            tokio::select! {
                biased;
                _ = stop.wait() => break,
                accepted = accept_next(listener.as_ref()) => match accepted {
                    Ok((stream, addr)) => {
                        if self.peers.reserve(addr, Direction::Inbound) {
                            tracing::debug!(%addr, "accepted peer");
                            conns.spawn(drain(stream, addr, Arc::clone(&self.peers)));
                        } else {
                            tracing::debug!(%addr, "rejecting peer: duplicate or peer limit reached");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "accept failed"),
                },
                _ = dial_tick.tick(), if dialing => self.dial_next(&mut cursor, &mut conns),
                Some(joined) = conns.join_next(), if !conns.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            tracing::warn!(error = %e, "connection task panicked");
                        }
                    }
                }
            }
        }

        conns.abort_all();
        while conns.join_next().await.is_some() {}
        self.peers.clear();
        tracing::info!("daemon stopped");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), SubsystemError> {
        if self.stop.fire() {
            tracing::debug!("daemon shutdown requested");
        }
        Ok(())
    }
}
