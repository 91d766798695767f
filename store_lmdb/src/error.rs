use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(#[from] heed::Error),

    #[error("failed to prepare data directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create lock file {}: {source}", .path.display())]
    LockFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database {} is already in use{}", .path.display(), holder(.pid))]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    #[error(transparent)]
    Store(#[from] suncoin_store::StoreError),
}

impl From<LmdbError> for suncoin_store::StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::Store(inner) => inner,
            other => suncoin_store::StoreError::Backend(other.to_string()),
        }
    }
}

fn holder(pid: &Option<u32>) -> String {
    pid.map(|p| format!(" by process {p}")).unwrap_or_default()
}
