//! Fundamental types for the Suncoin node.
//!
//! This crate defines the values shared across every other crate in the
//! workspace: addresses, spent outputs, emission constants and the genesis
//! parameters of the network the node joins.

pub mod address;
pub mod error;
pub mod hash;
pub mod output;
pub mod params;

pub use address::Address;
pub use error::{AddressError, ParamsError};
pub use hash::OutputHash;
pub use output::Output;
pub use params::{EmissionParams, NetworkParams};
