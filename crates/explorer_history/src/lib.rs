//! explorer_history — account transaction history from block explorer APIs.
//!
//! Fetches an account's `txlist` from an explorer with a strict minimum
//! spacing between calls, decodes the decimal-string fields without loss of
//! precision, and normalizes the batch for one account: duplicates removed,
//! ownership checked, each record tagged outgoing, incoming or self.
//! Read-only; no signing.

pub mod address;
pub mod chain;
pub mod codec;
pub mod transaction;

pub use address::{Address, AddressError, Counterparty};
pub use chain::{
    decode_response, normalize, FetchConfig, FetchError, Fetcher, NormalizeError,
    TransactionHistory,
};
pub use codec::DecodeError;
pub use transaction::{Direction, RawTransaction, Transaction, TxHash};
