//! Abstract storage traits for the Suncoin node.
//!
//! The ledger database is owned by the node for the whole process
//! lifetime. The rest of the workspace depends only on these traits.

pub mod error;
pub mod meta;

pub use error::StoreError;
pub use meta::{MetaStore, CURRENT_SCHEMA_VERSION};
