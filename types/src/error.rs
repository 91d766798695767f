//! Error types for address decoding and parameter validation.

use thiserror::Error;

/// Errors produced while decoding an [`Address`](crate::Address).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("invalid base58 character {0:?}")]
    InvalidCharacter(char),

    #[error("decoded address has {0} bytes, expected 25")]
    InvalidLength(usize),

    #[error("address checksum mismatch")]
    InvalidChecksum,
}

/// Errors produced while validating emission or network parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("distribution address count must be non-zero")]
    NoDistributionAddresses,

    #[error("max coin supply {supply} is not evenly divisible by {addresses} distribution addresses")]
    UnevenDistribution { supply: u64, addresses: u64 },

    #[error("initial unlocked count {unlocked} exceeds {total} distribution addresses")]
    UnlockedCountOutOfRange { unlocked: u64, total: u64 },

    #[error("invalid genesis address: {0}")]
    GenesisAddress(#[from] AddressError),

    #[error("invalid hex for {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidKeyLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}
