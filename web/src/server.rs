//! HTTP(S) server for the web interface.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use suncoin_network::Gateway;
use suncoin_utils::{ShutdownSignal, Subsystem, SubsystemError};

use crate::config::WebConfig;
use crate::csrf::{self, CsrfTokens};
use crate::error::WebError;
use crate::routes::{self, AppState};

const NAME: &str = "web";

/// How long in-flight requests get to finish once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The web interface handle.
pub struct WebServer {
    config: WebConfig,
    gateway: Arc<Gateway>,
    csrf: Arc<CsrfTokens>,
    tls: Option<RustlsConfig>,
    handle: Handle,
    stop: ShutdownSignal,
}

impl WebServer {
    /// Build the server. With TLS configured the certificate and key are
    /// loaded here, so a bad pair fails startup rather than `run`.
    pub async fn new(config: WebConfig, gateway: Arc<Gateway>) -> Result<Self, WebError> {
        let tls = match &config.tls {
            Some(tls) => Some(
                RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                    .await
                    .map_err(|source| WebError::Tls {
                        cert: tls.cert_path.clone(),
                        key: tls.key_path.clone(),
                        source,
                    })?,
            ),
            None => None,
        };
        Ok(Self {
            config,
            gateway,
            csrf: Arc::new(CsrfTokens::default()),
            tls,
            handle: Handle::new(),
            stop: ShutdownSignal::new(),
        })
    }

    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Address operators should point a browser at, e.g. `http://127.0.0.1:7620`.
    pub fn full_address(&self) -> String {
        format!("{}://{}", self.config.scheme(), self.config.bind_addr)
    }

    /// Wait for the listener to come up and return its bound address.
    /// Returns `None` if the server failed to bind or has stopped.
    pub async fn listening(&self) -> Option<SocketAddr> {
        self.handle.listening().await
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            gateway: Arc::clone(&self.gateway),
            csrf: Arc::clone(&self.csrf),
        };
        let mut app = Router::new()
            .route("/api/version", get(routes::version))
            .route("/api/status", get(routes::status))
            .route("/api/csrf", get(routes::csrf_token))
            .route("/api/outputs/locked", post(routes::outputs_locked))
            .with_state(state)
            .fallback_service(ServeDir::new(&self.config.static_dir));
        if !self.config.disable_csrf {
            app = app.layer(middleware::from_fn_with_state(
                Arc::clone(&self.csrf),
                csrf::require_token,
            ));
        }
        app.layer(TraceLayer::new_for_http())
    }
}

#[async_trait]
impl Subsystem for WebServer {
    fn name(&self) -> &str {
        NAME
    }

    async fn run(&self) -> Result<(), SubsystemError> {
        if self.stop.is_fired() {
            return Ok(());
        }
        let app = self.router().into_make_service();
        let addr = self.config.bind_addr;
        tracing::info!(address = %self.full_address(), "web interface starting");

        let served = match &self.tls {
            Some(tls) => {
                axum_server::bind_rustls(addr, tls.clone())
                    .handle(self.handle.clone())
                    .serve(app)
                    .await
            }
            None => {
                axum_server::bind(addr)
                    .handle(self.handle.clone())
                    .serve(app)
                    .await
            }
        };

        tracing::info!("web interface stopped");
        served.map_err(|e| SubsystemError::new(NAME, format!("{addr}: {e}")))
    }

    async fn shutdown(&self) -> Result<(), SubsystemError> {
        if self.stop.fire() {
            self.handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
        Ok(())
    }
}
