//! JSON-RPC interface for the Suncoin node.
//!
//! Requests arrive over `POST /webrpc`, are queued on a bounded channel and
//! answered by a fixed pool of workers that query the network [`Gateway`].
//!
//! [`Gateway`]: suncoin_network::Gateway

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ErrorObject, RpcError};
pub use handlers::{handle_request, JsonRpcResponse};
pub use server::{RpcConfig, RpcServer};
