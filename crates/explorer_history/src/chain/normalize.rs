//! Per-account normalization of an explorer result batch.

use crate::address::Address;
use crate::transaction::{Direction, Transaction};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("transaction {hash} does not involve account {address}")]
    OwnershipMismatch { hash: String, address: Address },
}

/// Classify a record against `account`, or `None` if it involves neither side.
pub fn classify(tx: &Transaction, account: &Address) -> Option<Direction> {
    let sent = tx.sender() == *account;
    let received = tx.counterparty().address() == *account;
    match (sent, received) {
        (true, true) => Some(Direction::SelfTransfer),
        (true, false) => Some(Direction::Outgoing),
        (false, true) => Some(Direction::Incoming),
        (false, false) => None,
    }
}

/// Drop repeated hashes, check every record involves `account`, and tag each
/// with its direction relative to `account`.
///
/// The explorer lists a record twice when sender and recipient are the same
/// address; only the first occurrence is kept. Input order is preserved. Any
/// record not involving `account` fails the whole batch.
pub fn normalize(
    transactions: Vec<Transaction>,
    account: &Address,
) -> Result<Vec<Transaction>, NormalizeError> {
    let total = transactions.len();
    let mut seen = HashSet::with_capacity(total);
    let mut out = Vec::with_capacity(total);
    for mut tx in transactions {
        if !seen.insert(tx.hash()) {
            continue;
        }
        let direction = classify(&tx, account).ok_or_else(|| NormalizeError::OwnershipMismatch {
            hash: tx.id(),
            address: *account,
        })?;
        tx.set_direction(direction);
        out.push(tx);
    }
    debug!(total, kept = out.len(), account = %account, "normalized");
    Ok(out)
}
