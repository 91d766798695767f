//! Emission lock policy over the genesis distribution addresses.
//!
//! The genesis block splits the whole coin supply evenly across a fixed,
//! ordered table of reserved addresses. Only the first
//! `initial_unlocked_count` of them may be spent; a transaction spending an
//! output owned by any other reserved address must be rejected outright.
//!
//! The policy is pure address-set membership. It never looks at chain
//! height or wall-clock time: releasing further addresses is done by
//! shipping a new `initial_unlocked_count`, not by a live timer.

pub mod distribution;
pub mod error;
pub mod policy;

pub use distribution::{ReservedAddress, ReservedAddressTable, DISTRIBUTION_ADDRESSES};
pub use error::EmissionError;
pub use policy::EmissionPolicy;
