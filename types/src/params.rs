//! Emission constants and genesis parameters.
//!
//! Both are built once at startup and handed to the components that need
//! them; nothing in the node reads process-wide mutable state.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::Address;

/// Maximum number of coins that will ever exist.
pub const MAX_COIN_SUPPLY: u64 = 300_000_000;

/// Number of reserved distribution addresses created at genesis.
pub const DISTRIBUTION_ADDRESSES_TOTAL: u64 = 100;

/// Number of distribution addresses that are spendable from genesis.
pub const INITIAL_UNLOCKED_COUNT: u64 = 1;

/// Number of addresses released per unlock interval once the initial
/// tranche is exhausted. Informational: releases are applied by shipping a
/// new `initial_unlocked_count`.
pub const UNLOCK_ADDRESS_RATE: u64 = 5;

/// Unlock interval in seconds (one year). Informational, see
/// [`UNLOCK_ADDRESS_RATE`].
pub const UNLOCK_TIME_INTERVAL_SECS: u64 = 60 * 60 * 24 * 365;

/// Parameters of the genesis coin distribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionParams {
    pub max_coin_supply: u64,
    pub distribution_addresses_total: u64,
    pub initial_unlocked_count: u64,
    pub unlock_address_rate: u64,
    pub unlock_time_interval_secs: u64,
}

impl EmissionParams {
    /// Check the load-time invariants of the distribution.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.distribution_addresses_total == 0 {
            return Err(ParamsError::NoDistributionAddresses);
        }
        if self.max_coin_supply % self.distribution_addresses_total != 0 {
            return Err(ParamsError::UnevenDistribution {
                supply: self.max_coin_supply,
                addresses: self.distribution_addresses_total,
            });
        }
        if self.initial_unlocked_count > self.distribution_addresses_total {
            return Err(ParamsError::UnlockedCountOutOfRange {
                unlocked: self.initial_unlocked_count,
                total: self.distribution_addresses_total,
            });
        }
        Ok(())
    }

    /// Initial balance of every distribution address.
    ///
    /// Only meaningful once [`validate`](Self::validate) has succeeded.
    pub fn distribution_address_initial_balance(&self) -> u64 {
        self.max_coin_supply / self.distribution_addresses_total
    }
}

impl Default for EmissionParams {
    fn default() -> Self {
        Self {
            max_coin_supply: MAX_COIN_SUPPLY,
            distribution_addresses_total: DISTRIBUTION_ADDRESSES_TOTAL,
            initial_unlocked_count: INITIAL_UNLOCKED_COUNT,
            unlock_address_rate: UNLOCK_ADDRESS_RATE,
            unlock_time_interval_secs: UNLOCK_TIME_INTERVAL_SECS,
        }
    }
}

// ── Genesis ────────────────────────────────────────────────────────────

pub const GENESIS_ADDRESS: &str = "5L1jvbwtGS8eL3afA2gsqTBc8KEPFDDRjZ";
pub const GENESIS_SIGNATURE: &str = "3a2c8762df667edb5aa0cda6db52c36d490951bb35ff27ade65e76963f2bb7170be73e85474c45784cab2acbd9dbe1853d073e954badf8a395e9db7cb3261d1700";
pub const BLOCKCHAIN_PUBKEY: &str =
    "0255434580f86e14a26e1d5c59b0626dfa28003741c475155aeedaa92af797d043";
pub const GENESIS_TIMESTAMP: u64 = 1_494_861_716;
/// Genesis coin volume in droplets (300e12).
const GENESIS_COIN_VOLUME: u64 = 300_000_000_000_000;
const DEFAULT_CONNECTIONS: &[&str] = &["116.62.220.158:7200", "119.23.23.184:7200"];

const SIGNATURE_LEN: usize = 65;
const PUBKEY_LEN: usize = 33;
const SECKEY_LEN: usize = 32;

/// Genesis and chain-identity parameters of the network the node joins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkParams {
    pub genesis_address: Address,
    pub genesis_signature: [u8; SIGNATURE_LEN],
    pub genesis_timestamp: u64,
    pub genesis_coin_volume: u64,
    pub blockchain_pubkey: [u8; PUBKEY_LEN],
    /// Only set on a master node; never logged.
    pub blockchain_seckey: Option<[u8; SECKEY_LEN]>,
    pub default_connections: Vec<String>,
}

impl NetworkParams {
    /// Parameters of the production network.
    pub fn mainnet() -> Result<Self, ParamsError> {
        Self::from_hex(
            GENESIS_ADDRESS,
            GENESIS_SIGNATURE,
            BLOCKCHAIN_PUBKEY,
            None,
            GENESIS_TIMESTAMP,
        )
    }

    /// Build parameters from their textual representations.
    pub fn from_hex(
        genesis_address: &str,
        genesis_signature: &str,
        blockchain_pubkey: &str,
        blockchain_seckey: Option<&str>,
        genesis_timestamp: u64,
    ) -> Result<Self, ParamsError> {
        let genesis_address = Address::from_base58(genesis_address)?;
        let genesis_signature = decode_fixed::<SIGNATURE_LEN>("genesis signature", genesis_signature)?;
        let blockchain_pubkey = decode_fixed::<PUBKEY_LEN>("blockchain public key", blockchain_pubkey)?;
        let blockchain_seckey = match blockchain_seckey {
            Some(s) if !s.is_empty() => Some(decode_fixed::<SECKEY_LEN>("blockchain secret key", s)?),
            _ => None,
        };

        Ok(Self {
            genesis_address,
            genesis_signature,
            genesis_timestamp,
            genesis_coin_volume: GENESIS_COIN_VOLUME,
            blockchain_pubkey,
            blockchain_seckey,
            default_connections: DEFAULT_CONNECTIONS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Whether this node holds the chain's secret key.
    pub fn is_master(&self) -> bool {
        self.blockchain_seckey.is_some()
    }
}

fn decode_fixed<const N: usize>(field: &'static str, s: &str) -> Result<[u8; N], ParamsError> {
    let bytes = hex::decode(s).map_err(|e| ParamsError::InvalidHex {
        field,
        reason: e.to_string(),
    })?;
    bytes.try_into().map_err(|v: Vec<u8>| ParamsError::InvalidKeyLength {
        field,
        expected: N,
        actual: v.len(),
    })
}
