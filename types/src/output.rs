//! Unspent outputs referenced by a transaction's inputs.

use serde::{Deserialize, Serialize};

use crate::{Address, OutputHash};

/// An unspent output being consumed by a transaction.
///
/// Only the owning [`Address`] matters to the emission lock policy; the
/// remaining fields are carried for callers that log or display spends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// Identifier of the output.
    pub hash: OutputHash,
    /// Address that owns the output.
    pub address: Address,
    /// Coin amount held by the output, in whole coins.
    pub coins: u64,
    /// Coin hours accumulated by the output.
    pub hours: u64,
}

impl Output {
    pub fn new(hash: OutputHash, address: Address, coins: u64, hours: u64) -> Self {
        Self {
            hash,
            address,
            coins,
            hours,
        }
    }
}
