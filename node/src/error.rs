use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid {field}: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("network parameters: {0}")]
    Params(#[from] suncoin_types::ParamsError),

    #[error(transparent)]
    Subsystem(#[from] suncoin_utils::SubsystemError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
