use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database schema {found} is newer than supported {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },
}
