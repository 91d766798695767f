//! LMDB storage backend for the Suncoin node.
//!
//! The environment is guarded by an advisory lock file so that a second
//! process pointed at the same data directory fails fast at startup
//! instead of sharing the store.

pub mod environment;
pub mod error;
pub mod handle;
pub mod lock;
pub mod meta;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use handle::DatabaseHandle;
pub use lock::DatabaseLock;
