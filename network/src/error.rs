use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid listen address {0:?}")]
    InvalidListenAddress(String),

    #[error("invalid peer address {0:?}")]
    InvalidPeerAddress(String),

    #[error("outgoing connection limit must be non-zero when outgoing connections are enabled")]
    NoOutgoingSlots,
}
