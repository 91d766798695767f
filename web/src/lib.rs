//! Web interface for the Suncoin node.
//!
//! Serves a small JSON API backed by the network [`Gateway`] and the GUI's
//! static assets, over plain HTTP or rustls. State-changing requests must
//! carry a CSRF token issued by `GET /api/csrf` unless CSRF checks are
//! disabled.
//!
//! [`Gateway`]: suncoin_network::Gateway

pub mod config;
pub mod csrf;
pub mod error;
pub mod routes;
pub mod server;

pub use config::{TlsConfig, WebConfig};
pub use csrf::{CsrfTokens, CSRF_HEADER};
pub use error::WebError;
pub use server::WebServer;
