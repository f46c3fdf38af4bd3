//! Explorer transaction records: the raw wire shape and the resolved record.

use crate::address::{Address, AddressError, Counterparty};
use crate::codec::{self, DecodeError};
use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// 32-byte transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| DecodeError::InvalidHash(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({self})")
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// How a record relates to the account it was normalized against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Incoming,
    SelfTransfer,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Outgoing => "outgoing",
            Self::Incoming => "incoming",
            Self::SelfTransfer => "self_transfer",
        })
    }
}

/// One element of the explorer's `txlist` result, as sent.
///
/// Numeric and time fields arrive as decimal strings and are decoded here;
/// `to` and `contractAddress` are kept raw until [`Transaction::try_from`]
/// resolves them, since exactly one of them is expected to be non-empty.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(with = "codec::decimal")]
    pub gas_used: BigUint,
    #[serde(with = "codec::decimal")]
    pub gas_price: BigUint,
    pub hash: TxHash,
    #[serde(rename = "timeStamp", with = "codec::unix_seconds")]
    pub timestamp: OffsetDateTime,
    #[serde(with = "codec::decimal")]
    pub confirmations: BigUint,
    pub from: Address,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(with = "codec::decimal")]
    pub value: BigUint,
}

/// A decoded record with its counterparty resolved.
///
/// `direction` stays `None` until the record passes through
/// [`normalize`](crate::chain::normalize()).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    hash: TxHash,
    #[serde(with = "codec::unix_seconds")]
    timestamp: OffsetDateTime,
    from: Address,
    counterparty: Counterparty,
    #[serde(with = "codec::decimal")]
    value: BigUint,
    #[serde(with = "codec::decimal")]
    fee: BigUint,
    #[serde(with = "codec::decimal")]
    gas_used: BigUint,
    #[serde(with = "codec::decimal")]
    gas_price: BigUint,
    #[serde(with = "codec::decimal")]
    confirmations: BigUint,
    direction: Option<Direction>,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = AddressError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let counterparty = Counterparty::resolve(
            raw.to.as_deref().unwrap_or_default(),
            raw.contract_address.as_deref().unwrap_or_default(),
        )?;
        let fee = &raw.gas_used * &raw.gas_price;
        Ok(Self {
            hash: raw.hash,
            timestamp: raw.timestamp,
            from: raw.from,
            counterparty,
            value: raw.value,
            fee,
            gas_used: raw.gas_used,
            gas_price: raw.gas_price,
            confirmations: raw.confirmations,
            direction: None,
        })
    }
}

impl Transaction {
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Identifier used for de-duplication and display.
    pub fn id(&self) -> String {
        self.hash.to_string()
    }

    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    pub fn sender(&self) -> Address {
        self.from
    }

    pub fn counterparty(&self) -> Counterparty {
        self.counterparty
    }

    pub fn amount(&self) -> &BigUint {
        &self.value
    }

    /// gas used * gas price.
    pub fn fee(&self) -> &BigUint {
        &self.fee
    }

    pub fn gas_used(&self) -> &BigUint {
        &self.gas_used
    }

    pub fn gas_price(&self) -> &BigUint {
        &self.gas_price
    }

    /// Gas used, if it fits in 64 bits.
    pub fn gas(&self) -> Option<u64> {
        u64::try_from(&self.gas_used).ok()
    }

    /// Confirmation count, saturating at `u64::MAX`.
    pub fn confirmations(&self) -> u64 {
        u64::try_from(&self.confirmations).unwrap_or(u64::MAX)
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) {
        self.direction = Some(direction);
    }
}
