//! Database lifecycle handle driven by the node supervisor.

use std::sync::Arc;

use async_trait::async_trait;

use suncoin_utils::{ShutdownSignal, Subsystem, SubsystemError};

use crate::LmdbEnvironment;

const NAME: &str = "database";

/// Keeps the ledger database open for the life of the node.
///
/// `run` idles until shutdown; `shutdown` flushes the environment to disk.
/// The directory lock is released once the last clone of the environment
/// is dropped.
pub struct DatabaseHandle {
    env: Arc<LmdbEnvironment>,
    stop: ShutdownSignal,
}

impl DatabaseHandle {
    pub fn new(env: Arc<LmdbEnvironment>) -> Self {
        Self {
            env,
            stop: ShutdownSignal::new(),
        }
    }

    pub fn environment(&self) -> &Arc<LmdbEnvironment> {
        &self.env
    }
}

#[async_trait]
impl Subsystem for DatabaseHandle {
    fn name(&self) -> &str {
        NAME
    }

    async fn run(&self) -> Result<(), SubsystemError> {
        self.stop.wait().await;
        tracing::debug!("database handle released");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), SubsystemError> {
        if !self.stop.fire() {
            return Ok(());
        }
        self.env.sync().map_err(|e| SubsystemError::new(NAME, e))?;
        tracing::info!(path = %self.env.path().display(), "database flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn open_handle() -> (tempfile::TempDir, Arc<DatabaseHandle>) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open_with_map_size(dir.path(), 16 << 20).unwrap();
        (dir, Arc::new(DatabaseHandle::new(Arc::new(env))))
    }

    #[tokio::test]
    async fn shutdown_makes_run_return() {
        let (_dir, handle) = open_handle();
        let runner = {
            let handle = Arc::clone(&handle);
            tokio::spawn(async move { handle.run().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.shutdown().await.unwrap();
        let result = tokio::time::timeout(Duration::from_secs(2), runner)
            .await
            .expect("run returned")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn shutdown_before_run_is_honoured() {
        let (_dir, handle) = open_handle();
        handle.shutdown().await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle.run())
            .await
            .expect("run must not block after shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn repeated_shutdown_is_a_no_op() {
        let (_dir, handle) = open_handle();
        handle.shutdown().await.unwrap();
        handle.shutdown().await.unwrap();
    }
}
