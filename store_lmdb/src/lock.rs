//! Exclusive process lock on a database directory.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::LmdbError;

/// Exclusive advisory lock on a data directory, released on drop.
///
/// The lock file holds the PID of the owner so that a refused second
/// process can name the holder in its error.
#[derive(Debug)]
pub struct DatabaseLock {
    file: File,
    path: PathBuf,
}

impl DatabaseLock {
    const LOCK_FILE: &'static str = "LOCK";

    /// Take the lock or fail immediately if another holder exists.
    pub fn acquire(dir: &Path) -> Result<Self, LmdbError> {
        let path = dir.join(Self::LOCK_FILE);

        // No truncate here: a refused opener must still be able to read the
        // holder's PID.
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LmdbError::LockFile {
                path: path.clone(),
                source,
            })?;

        if file.try_lock_exclusive().is_err() {
            return Err(LmdbError::AlreadyLocked {
                pid: read_pid(&path),
                path,
            });
        }

        let write_pid = |file: &mut File| -> std::io::Result<()> {
            file.set_len(0)?;
            writeln!(file, "{}", std::process::id())?;
            file.sync_all()
        };
        write_pid(&mut file).map_err(|source| LmdbError::LockFile {
            path: path.clone(),
            source,
        })?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DatabaseLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}
