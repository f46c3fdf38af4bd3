//! Explorer fetching, rate limiting, and normalization.

pub mod fetch;
mod limiter;
pub mod normalize;

pub use fetch::{decode_response, FetchConfig, FetchError, Fetcher};
pub use limiter::RateLimiter;
pub use normalize::{classify, normalize, NormalizeError};

use crate::address::Address;
use crate::transaction::Transaction;
use async_trait::async_trait;

/// A source of per-account transaction history. `fetch_and_normalize` is the
/// entry point for account sync.
#[async_trait]
pub trait TransactionHistory: Send + Sync {
    /// Raw records for `address` up to block `end_block`, newest first.
    async fn fetch_transactions(
        &self,
        address: &Address,
        end_block: u64,
    ) -> Result<Vec<Transaction>, FetchError>;

    /// Fetch, then de-duplicate and classify against `address`. Fails without
    /// a partial result if any step fails.
    async fn fetch_and_normalize(
        &self,
        address: &Address,
        end_block: u64,
    ) -> Result<Vec<Transaction>, FetchError> {
        let txs = self.fetch_transactions(address, end_block).await?;
        Ok(normalize(txs, address)?)
    }
}

#[async_trait]
impl TransactionHistory for Fetcher {
    async fn fetch_transactions(
        &self,
        address: &Address,
        end_block: u64,
    ) -> Result<Vec<Transaction>, FetchError> {
        self.transactions(address, end_block).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Direction;

    /// Serves a canned response body regardless of the block bound.
    struct Canned(&'static str);

    #[async_trait]
    impl TransactionHistory for Canned {
        async fn fetch_transactions(
            &self,
            _address: &Address,
            _end_block: u64,
        ) -> Result<Vec<Transaction>, FetchError> {
            decode_response(self.0)
        }
    }

    const BODY: &str = r#"{"result":[
        {"timeStamp":"2","hash":"0x0202020202020202020202020202020202020202020202020202020202020202",
         "from":"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa","to":"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
         "contractAddress":"","value":"1","gasPrice":"1","gasUsed":"1","confirmations":"1"},
        {"timeStamp":"2","hash":"0x0202020202020202020202020202020202020202020202020202020202020202",
         "from":"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa","to":"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
         "contractAddress":"","value":"1","gasPrice":"1","gasUsed":"1","confirmations":"1"},
        {"timeStamp":"1","hash":"0x0101010101010101010101010101010101010101010101010101010101010101",
         "from":"0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb","to":"",
         "contractAddress":"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa","value":"0","gasPrice":"1","gasUsed":"1","confirmations":"2"}
    ]}"#;

    #[tokio::test]
    async fn default_fetch_and_normalize() {
        let account: Address = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".parse().unwrap();
        let txs = Canned(BODY)
            .fetch_and_normalize(&account, 100)
            .await
            .unwrap();
        let directions: Vec<_> = txs.iter().map(|t| t.direction()).collect();
        assert_eq!(
            directions,
            vec![Some(Direction::SelfTransfer), Some(Direction::Incoming)]
        );
    }

    #[tokio::test]
    async fn default_fetch_and_normalize_foreign_account() {
        let other: Address = "0xcccccccccccccccccccccccccccccccccccccccc".parse().unwrap();
        let err = Canned(BODY)
            .fetch_and_normalize(&other, 100)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Normalize(NormalizeError::OwnershipMismatch { .. })
        ));
    }
}
