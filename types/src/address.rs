//! Public-key-derived address type with base58check text encoding.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of the public key hash carried by an address.
pub const ADDRESS_KEY_LEN: usize = 20;

/// Length of the decoded text form: key, version byte, 4-byte checksum.
const ENCODED_LEN: usize = ADDRESS_KEY_LEN + 1 + 4;

/// A Suncoin address: a 20-byte public key hash plus a version byte.
///
/// The text form is base58 of `key || version || checksum`, where the
/// checksum is the first four bytes of `SHA-256(key || version)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    version: u8,
    key: [u8; ADDRESS_KEY_LEN],
}

impl Address {
    pub fn new(version: u8, key: [u8; ADDRESS_KEY_LEN]) -> Self {
        Self { version, key }
    }

    /// Decode and verify a base58check address string.
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let bytes = decode_base58(s)?;
        if bytes.len() != ENCODED_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }

        let mut key = [0u8; ADDRESS_KEY_LEN];
        key.copy_from_slice(&bytes[..ADDRESS_KEY_LEN]);
        let addr = Self::new(bytes[ADDRESS_KEY_LEN], key);

        if addr.checksum() != bytes[ADDRESS_KEY_LEN + 1..] {
            return Err(AddressError::InvalidChecksum);
        }
        Ok(addr)
    }

    /// Encode the address as base58check text.
    pub fn to_base58(&self) -> String {
        let mut bytes = Vec::with_capacity(ENCODED_LEN);
        bytes.extend_from_slice(&self.key);
        bytes.push(self.version);
        bytes.extend_from_slice(&self.checksum());
        encode_base58(&bytes)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn key(&self) -> &[u8; ADDRESS_KEY_LEN] {
        &self.key
    }

    fn checksum(&self) -> [u8; 4] {
        let mut hasher = Sha256::new();
        hasher.update(self.key);
        hasher.update([self.version]);
        let digest = hasher.finalize();
        let mut out = [0u8; 4];
        out.copy_from_slice(&digest[..4]);
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_base58(&s)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_base58()
    }
}

fn decode_base58(s: &str) -> Result<Vec<u8>, AddressError> {
    // Little-endian accumulator; reversed at the end.
    let mut bytes: Vec<u8> = Vec::with_capacity(ENCODED_LEN);
    for c in s.chars() {
        let digit = ALPHABET
            .iter()
            .position(|&a| a as char == c)
            .ok_or(AddressError::InvalidCharacter(c))? as u32;

        let mut carry = digit;
        for b in bytes.iter_mut() {
            carry += u32::from(*b) * 58;
            *b = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let leading_zeros = s.chars().take_while(|&c| c == '1').count();
    bytes.extend(std::iter::repeat(0).take(leading_zeros));
    bytes.reverse();
    Ok(bytes)
}

fn encode_base58(input: &[u8]) -> String {
    let mut digits: Vec<u8> = Vec::with_capacity(input.len() * 138 / 100 + 1);
    for &byte in input {
        let mut carry = u32::from(byte);
        for d in digits.iter_mut() {
            carry += u32::from(*d) << 8;
            *d = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let leading_zeros = input.iter().take_while(|&&b| b == 0).count();
    let mut out = String::with_capacity(leading_zeros + digits.len());
    out.extend(std::iter::repeat('1').take(leading_zeros));
    out.extend(digits.iter().rev().map(|&d| ALPHABET[d as usize] as char));
    out
}
