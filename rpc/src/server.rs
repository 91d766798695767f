//! Axum-based RPC server with a bounded request queue.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Bytes, extract::State, http::StatusCode, response::IntoResponse, routing::post, Json,
    Router,
};
use axum_server::Handle;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinSet;

use suncoin_network::Gateway;
use suncoin_utils::{ShutdownSignal, Subsystem, SubsystemError};

use crate::error::RpcError;
use crate::handlers::{handle_request, JsonRpcResponse};

const NAME: &str = "rpc";

/// How long in-flight requests get to finish once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// RPC interface settings.
#[derive(Clone, Debug)]
pub struct RpcConfig {
    pub bind_addr: SocketAddr,
    /// Number of workers answering queued requests.
    pub worker_num: usize,
    /// Requests that may wait for a worker before callers are held back.
    pub queue_depth: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7630)),
            worker_num: 5,
            queue_depth: 1000,
        }
    }
}

struct Job {
    body: Bytes,
    reply: oneshot::Sender<JsonRpcResponse>,
}

type JobQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

/// The RPC server handle.
pub struct RpcServer {
    config: RpcConfig,
    gateway: Arc<Gateway>,
    local_addr: OnceLock<SocketAddr>,
    handle: Handle,
    stop: ShutdownSignal,
}

impl RpcServer {
    pub fn new(config: RpcConfig, gateway: Arc<Gateway>) -> Result<Self, RpcError> {
        if config.worker_num == 0 {
            return Err(RpcError::Config("worker_num must be at least 1".into()));
        }
        if config.queue_depth == 0 {
            return Err(RpcError::Config("queue_depth must be at least 1".into()));
        }
        Ok(Self {
            config,
            gateway,
            local_addr: OnceLock::new(),
            handle: Handle::new(),
            stop: ShutdownSignal::new(),
        })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Address the server is bound to, once it is up.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }
}

async fn worker(id: usize, queue: JobQueue, gateway: Arc<Gateway>) {
    loop {
        let job = queue.lock().await.recv().await;
        let Some(job) = job else { break };
        let response = handle_request(&gateway, &job.body);
        if job.reply.send(response).is_err() {
            tracing::debug!(worker = id, "rpc caller went away before reply");
        }
    }
    tracing::trace!(worker = id, "rpc worker exiting");
}

async fn webrpc(State(jobs): State<mpsc::Sender<Job>>, body: Bytes) -> axum::response::Response {
    let (reply, response) = oneshot::channel();
    if jobs.send(Job { body, reply }).await.is_err() {
        return (StatusCode::SERVICE_UNAVAILABLE, RpcError::QueueClosed.to_string()).into_response();
    }
    match response.await {
        Ok(resp) => Json(resp).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, RpcError::QueueClosed.to_string()).into_response(),
    }
}

#[async_trait]
impl Subsystem for RpcServer {
    fn name(&self) -> &str {
        NAME
    }

    async fn run(&self) -> Result<(), SubsystemError> {
        if self.stop.is_fired() {
            return Ok(());
        }
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr)
            .await
            .map_err(|e| {
                SubsystemError::new(NAME, format!("failed to listen on {}: {e}", self.config.bind_addr))
            })?;
        let local = listener
            .local_addr()
            .map_err(|e| SubsystemError::new(NAME, e))?;
        let listener = listener
            .into_std()
            .map_err(|e| SubsystemError::new(NAME, e))?;
        let _ = self.local_addr.set(local);

        let (jobs, queue) = mpsc::channel::<Job>(self.config.queue_depth);
        let queue: JobQueue = Arc::new(Mutex::new(queue));
        let mut workers = JoinSet::new();
        for id in 0..self.config.worker_num {
            workers.spawn(worker(id, Arc::clone(&queue), Arc::clone(&self.gateway)));
        }

        let app = Router::new().route("/webrpc", post(webrpc)).with_state(jobs);

        tracing::info!(addr = %local, workers = self.config.worker_num, "RPC server listening");
        let served = axum_server::from_tcp(listener)
            .handle(self.handle.clone())
            .serve(app.into_make_service())
            .await;

        // Connections still open after the grace period were dropped, so
        // no caller is left awaiting a reply.
        workers.shutdown().await;
        tracing::info!("RPC server stopped");

        served.map_err(|e| SubsystemError::new(NAME, e))
    }

    async fn shutdown(&self) -> Result<(), SubsystemError> {
        if self.stop.fire() {
            self.handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
        Ok(())
    }
}
