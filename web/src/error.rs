use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("failed to load TLS certificate {} / key {}: {source}", .cert.display(), .key.display())]
    Tls {
        cert: PathBuf,
        key: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
