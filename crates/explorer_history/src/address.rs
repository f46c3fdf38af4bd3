//! Account addresses and counterparty resolution.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("account address expected, got {0:?}")]
    InvalidAddress(String),
    #[error("record has neither a recipient nor a contract address")]
    MissingCounterparty,
}

/// 20-byte account address. Equality is on the raw bytes, so two spellings
/// differing only in hex case are the same address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Mixed-case checksum rendering (EIP-55).
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = Keccak256::digest(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (digest[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Accepts 40 hex digits of any case, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 40 {
            return Err(AddressError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| AddressError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// The single "other side" of a record: a plain recipient, or the address of
/// a contract the record deployed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "address", rename_all = "snake_case")]
pub enum Counterparty {
    Recipient(Address),
    ContractCreation(Address),
}

impl Counterparty {
    /// Resolve the explorer's `to` / `contractAddress` pair. A non-empty `to`
    /// always wins; `contractAddress` is only consulted when `to` is empty.
    pub fn resolve(to: &str, contract_address: &str) -> Result<Self, AddressError> {
        if !to.is_empty() {
            return to.parse().map(Self::Recipient);
        }
        if !contract_address.is_empty() {
            return contract_address.parse().map(Self::ContractCreation);
        }
        Err(AddressError::MissingCounterparty)
    }

    pub fn address(&self) -> Address {
        match self {
            Self::Recipient(a) | Self::ContractCreation(a) => *a,
        }
    }

    pub fn is_contract_creation(&self) -> bool {
        matches!(self, Self::ContractCreation(_))
    }
}
