//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};
use suncoin_store::MetaStore;

use crate::lock::DatabaseLock;
use crate::meta::LmdbMetaStore;
use crate::LmdbError;

/// Default LMDB map size (1 GiB).
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment, its database handles and the process lock.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    meta_db: Database<Str, Bytes>,
    path: PathBuf,
    schema_version: u32,
    // Dropped last: the lock outlives the environment.
    _lock: DatabaseLock,
}

impl LmdbEnvironment {
    /// Open or create the environment at `path` with the default map size.
    pub fn open(path: &Path) -> Result<Self, LmdbError> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    /// Open or create the environment at `path`.
    ///
    /// Fails with [`LmdbError::AlreadyLocked`] if another handle (in this or
    /// any other process) holds the directory.
    pub fn open_with_map_size(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path).map_err(|source| LmdbError::Directory {
            path: path.to_path_buf(),
            source,
        })?;

        let lock = DatabaseLock::acquire(path)?;

        // SAFETY: the directory lock above guarantees no other handle maps
        // this environment.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let meta_db: Database<Str, Bytes> = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        let mut this = Self {
            env: Arc::new(env),
            meta_db,
            path: path.to_path_buf(),
            schema_version: 0,
            _lock: lock,
        };
        this.schema_version = this.meta_store().ensure_schema()?;

        tracing::debug!(
            path = %this.path.display(),
            schema = this.schema_version,
            "LMDB environment opened"
        );
        Ok(this)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
        }
    }

    /// Flush all committed transactions to disk.
    pub fn sync(&self) -> Result<(), LmdbError> {
        self.env.force_sync()?;
        Ok(())
    }
}
