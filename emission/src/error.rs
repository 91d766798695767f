//! Emission table errors. All of them are fatal at startup.

use suncoin_types::{AddressError, ParamsError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmissionError {
    #[error("invalid emission parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("distribution table has {actual} addresses, parameters require {expected}")]
    TableSize { expected: u64, actual: usize },

    #[error("distribution address #{ordinal} is invalid: {source}")]
    InvalidAddress {
        ordinal: usize,
        #[source]
        source: AddressError,
    },

    #[error("distribution address #{ordinal} duplicates #{first}")]
    DuplicateAddress { ordinal: usize, first: usize },
}
