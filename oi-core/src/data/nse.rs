//! NSE option-chain provider
//!
//! Fetches `/api/option-chain-indices?symbol=<SYMBOL>` and decodes the
//! `records` block into a [`Snapshot`]. Only the fields the exporter
//! publishes are decoded; everything else in the payload is ignored.
//!
//! The endpoint rejects requests without a browser-like `User-Agent`, so the
//! client always sends one.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::debug;

use super::{ChainEntry, OptionSide, Snapshot, SnapshotProvider};
use crate::config::ProviderConfig;
use crate::core::{ExporterError, FetchError};

const OPTION_CHAIN_PATH: &str = "/api/option-chain-indices";

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct OptionChainIndex {
    records: Records,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Records {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<OptionRecord>,
    underlying_value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    strike_price: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    expiry_date: String,
    /// Missing or null side decodes to the zero-strike sentinel
    #[serde(rename = "PE", default, deserialize_with = "null_as_default")]
    pe: OptionData,
    #[serde(rename = "CE", default, deserialize_with = "null_as_default")]
    ce: OptionData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionData {
    #[serde(default, deserialize_with = "null_as_default")]
    strike_price: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    open_interest: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    last_price: f64,
}

/// `null` reads as the zero value, same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<OptionData> for OptionSide {
    fn from(d: OptionData) -> Self {
        OptionSide::new(d.strike_price, d.open_interest, d.last_price)
    }
}

impl From<OptionChainIndex> for Snapshot {
    fn from(idx: OptionChainIndex) -> Self {
        let entries = idx
            .records
            .data
            .into_iter()
            .map(|r| ChainEntry {
                strike_price: r.strike_price,
                expiry_date: r.expiry_date,
                put: r.pe.into(),
                call: r.ce.into(),
            })
            .collect();

        Snapshot::new(idx.records.underlying_value, entries)
    }
}

/// Decode an option-chain response body
pub fn decode_snapshot(body: &[u8]) -> Result<Snapshot, FetchError> {
    let idx: OptionChainIndex = serde_json::from_slice(body)?;
    Ok(idx.into())
}

// ============================================================================
// NseClient
// ============================================================================

/// HTTP client for the NSE option-chain API
#[derive(Debug, Clone)]
pub struct NseClient {
    client: Client,
    base_url: String,
}

impl NseClient {
    /// Build a client against `base_url` (no trailing path)
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        request_timeout: Duration,
    ) -> Result<Self, ExporterError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(request_timeout)
            .build()
            .map_err(ExporterError::Client)?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ExporterError> {
        Self::new(
            config.base_url.clone(),
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SnapshotProvider for NseClient {
    async fn fetch(&self, symbol: &str) -> Result<Snapshot, FetchError> {
        let url = format!("{}{}", self.base_url, OPTION_CHAIN_PATH);

        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.bytes().await?;
        let snapshot = decode_snapshot(&body)?;

        debug!(
            symbol,
            entries = snapshot.entries.len(),
            underlying = snapshot.underlying_value,
            "fetched option chain"
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "records": {
            "timestamp": "22-Nov-2024 15:30:00",
            "underlyingValue": 48000.5,
            "data": [
                {
                    "strikePrice": 48000,
                    "expiryDate": "28-Nov-2024",
                    "PE": {"strikePrice": 48000, "expiryDate": "28-Nov-2024", "openInterest": 1200, "lastPrice": 55.1, "impliedVolatility": 12.3},
                    "CE": {"strikePrice": 48000, "expiryDate": "28-Nov-2024", "openInterest": 900, "lastPrice": 40.0}
                },
                {
                    "strikePrice": 49000,
                    "expiryDate": "28-Nov-2024",
                    "CE": {"strikePrice": 49000, "openInterest": 10, "lastPrice": 2.5}
                }
            ]
        },
        "filtered": {}
    }"#;

    #[test]
    fn test_decode_snapshot() {
        let snapshot = decode_snapshot(SAMPLE.as_bytes()).unwrap();
        assert_eq!(snapshot.underlying_value, 48000.5);
        assert_eq!(snapshot.entries.len(), 2);

        let first = &snapshot.entries[0];
        assert_eq!(first.expiry_date, "28-Nov-2024");
        assert_eq!(first.put, OptionSide::new(48000, 1200.0, 55.1));
        assert_eq!(first.call, OptionSide::new(48000, 900.0, 40.0));
    }

    #[test]
    fn test_missing_side_decodes_to_sentinel() {
        let snapshot = decode_snapshot(SAMPLE.as_bytes()).unwrap();
        let second = &snapshot.entries[1];
        assert_eq!(second.strike_price, 49000);
        assert!(!second.put.is_present());
        assert!(second.call.is_present());
    }

    #[test]
    fn test_null_side_decodes_to_sentinel() {
        let body = br#"{"records": {"underlyingValue": 1.0, "data": [
            {"strikePrice": 1, "expiryDate": "x", "PE": null,
             "CE": {"strikePrice": 1, "openInterest": null, "lastPrice": 3.5}}
        ]}}"#;
        let snapshot = decode_snapshot(body).unwrap();
        let entry = &snapshot.entries[0];
        assert!(!entry.put.is_present());
        assert_eq!(entry.call, OptionSide::new(1, 0.0, 3.5));
        assert_eq!(snapshot.present_sides(), 1);
    }

    #[test]
    fn test_null_data_is_empty_chain() {
        let snapshot =
            decode_snapshot(br#"{"records": {"underlyingValue": 2.5, "data": null}}"#).unwrap();
        assert_eq!(snapshot.underlying_value, 2.5);
        assert!(snapshot.entries.is_empty());
    }

    #[test]
    fn test_empty_object_is_rejected() {
        // Blocked requests get `{}` back; that must not look like an empty chain.
        let err = decode_snapshot(b"{}").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_missing_underlying_is_rejected() {
        let err = decode_snapshot(br#"{"records": {"data": []}}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = decode_snapshot(b"<html>Access Denied</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            NseClient::new("https://www.nseindia.com/", "test", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://www.nseindia.com");
    }
}
