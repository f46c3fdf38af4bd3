//! Explorer `txlist` client with per-instance rate limiting.

use crate::address::{Address, AddressError};
use crate::chain::limiter::RateLimiter;
use crate::chain::normalize::NormalizeError;
use crate::transaction::{RawTransaction, Transaction};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

const DEFAULT_EXPLORER_URL: &str = "https://api.etherscan.io/api";
/// Explorers typically allow five calls per second; keep a small margin.
const MIN_INTERVAL_MS: u64 = 210;

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub base_url: String,
    pub min_interval_ms: u64,
    pub api_key: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EXPLORER_URL.to_string(),
            min_interval_ms: MIN_INTERVAL_MS,
            api_key: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("http status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("explorer error: {message}: {result}")]
    Api { message: String, result: String },
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("address: {0}")]
    Address(#[from] AddressError),
    #[error("normalize: {0}")]
    Normalize(#[from] NormalizeError),
}

/// Response object. Explorers spell the payload key `result`; `Result` is
/// accepted too.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(alias = "Result")]
    result: serde_json::Value,
}

/// Decode a `txlist` response body into resolved records.
///
/// A string `result` is the explorer reporting an error (rate limit, bad
/// key, ...) and maps to [`FetchError::Api`]. Any malformed record fails the
/// whole body.
pub fn decode_response(body: &str) -> Result<Vec<Transaction>, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    match envelope.result {
        serde_json::Value::String(result) => {
            let message = envelope.message.unwrap_or_default();
            warn!(status = ?envelope.status, %message, %result, "explorer returned an error");
            Err(FetchError::Api { message, result })
        }
        serde_json::Value::Null => Ok(Vec::new()),
        result => {
            let raw: Vec<RawTransaction> = serde_json::from_value(result)?;
            let txs = raw
                .into_iter()
                .map(Transaction::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(txs)
        }
    }
}

/// Explorer client. Every call made through one instance goes through its
/// own [`RateLimiter`]; separate instances do not coordinate.
pub struct Fetcher {
    config: FetchConfig,
    base_url: Url,
    client: reqwest::Client,
    limiter: RateLimiter,
    request_count: AtomicU64,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        let limiter = RateLimiter::new(Duration::from_millis(config.min_interval_ms));
        Ok(Self {
            config,
            base_url,
            client,
            limiter,
            request_count: AtomicU64::new(0),
        })
    }

    /// One rate-limited GET; returns the body of a successful reply.
    async fn get_text(&self, params: &[(&str, String)]) -> Result<String, FetchError> {
        self.limiter.run(|| self.send(params)).await
    }

    async fn send(&self, params: &[(&str, String)]) -> Result<String, FetchError> {
        let logged: Vec<_> = params.iter().filter(|(k, _)| *k != "apikey").collect();
        debug!(url = %self.base_url, params = ?logged, "explorer request");
        let response = self
            .client
            .get(self.base_url.clone())
            .query(params)
            .send()
            .await?;
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, body_len = body.len(), "explorer response");
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// Account transactions from genesis up to `end_block`, newest first, as
    /// the explorer reports them (not yet de-duplicated or classified).
    pub async fn transactions(
        &self,
        address: &Address,
        end_block: u64,
    ) -> Result<Vec<Transaction>, FetchError> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("startblock", "0".to_string()),
            ("tag", "latest".to_string()),
            ("sort", "desc".to_string()),
            ("endblock", end_block.to_string()),
            ("address", address.to_string()),
        ];
        if let Some(key) = &self.config.api_key {
            params.push(("apikey", key.clone()));
        }
        let body = self.get_text(&params).await?;
        let txs = decode_response(&body)?;
        info!(address = %address, end_block, count = txs.len(), "txlist");
        Ok(txs)
    }

    /// Number of HTTP exchanges completed so far.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{
        "timeStamp": "1654646411",
        "hash": "0x0101010101010101010101010101010101010101010101010101010101010101",
        "from": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        "to": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        "contractAddress": "",
        "value": "5",
        "gasPrice": "1000000000",
        "gasUsed": "21000",
        "confirmations": "7"
    }"#;

    #[test]
    fn decode_records() {
        let body = format!(r#"{{"status":"1","message":"OK","result":[{RECORD}]}}"#);
        let txs = decode_response(&body).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].fee().to_string(), "21000000000000");
    }

    #[test]
    fn decode_capitalized_result_key() {
        let body = format!(r#"{{"Result":[{RECORD}]}}"#);
        assert_eq!(decode_response(&body).unwrap().len(), 1);
    }

    #[test]
    fn decode_no_transactions() {
        let body = r#"{"status":"0","message":"No transactions found","result":[]}"#;
        assert!(decode_response(body).unwrap().is_empty());
    }

    #[test]
    fn decode_api_error() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#;
        match decode_response(body) {
            Err(FetchError::Api { message, result }) => {
                assert_eq!(message, "NOTOK");
                assert_eq!(result, "Max rate limit reached");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn decode_not_json() {
        assert!(matches!(
            decode_response("<html>bad gateway</html>"),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn decode_bad_number_fails_body() {
        let bad = RECORD.replace(r#""value": "5""#, r#""value": "five""#);
        let body = format!(r#"{{"result":[{RECORD},{bad}]}}"#);
        assert!(matches!(decode_response(&body), Err(FetchError::Decode(_))));
    }

    #[test]
    fn decode_missing_counterparty_fails_body() {
        let bad = RECORD.replace(
            r#""to": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb""#,
            r#""to": """#,
        );
        let body = format!(r#"{{"result":[{RECORD},{bad}]}}"#);
        assert!(matches!(
            decode_response(&body),
            Err(FetchError::Address(AddressError::MissingCounterparty))
        ));
    }

    #[test]
    fn rejects_bad_base_url() {
        let config = FetchConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Fetcher::new(config),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
