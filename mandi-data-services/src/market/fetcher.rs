//! Fetch client for the data.gov.in daily mandi price resource.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use mandi_core::{MarketFilter, RawPriceRecord};

/// Daily mandi price resource on the data.gov.in open data platform
pub const DEFAULT_BASE_URL: &str =
    "https://api.data.gov.in/resource/3598678-0d79-46b4-9ed6-6f13308a1d24";

/// The resource caps responses; one page is enough for a single
/// commodity + district filter
const DEFAULT_LIMIT: u32 = 1000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from fetching raw price records.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API returned HTTP {0}")]
    Status(u16),

    #[error("failed to decode API response: {0}")]
    Decode(String),
}

/// Source of raw mandi price records for one filter triple.
///
/// The seam between the refresh coordinator and the network; tests swap in
/// in-memory implementations.
#[async_trait]
pub trait PriceRecordSource: Send + Sync {
    async fn fetch_records(&self, filter: &MarketFilter)
        -> Result<Vec<RawPriceRecord>, FetchError>;
}

/// data.gov.in resource API client.
#[derive(Clone)]
pub struct DataGovClient {
    client: Client,
    base_url: String,
    api_key: String,
    limit: u32,
}

/// Response envelope of the resource API; only `records` matters here.
#[derive(Debug, Deserialize)]
struct ResourceEnvelope {
    #[serde(default)]
    records: Vec<RawPriceRecord>,
}

impl DataGovClient {
    /// Create a client against the default resource endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (for tests and mirrors).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("mandi-trends/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            limit: DEFAULT_LIMIT,
        }
    }

    /// Override the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

#[async_trait]
impl PriceRecordSource for DataGovClient {
    async fn fetch_records(
        &self,
        filter: &MarketFilter,
    ) -> Result<Vec<RawPriceRecord>, FetchError> {
        let mut params: Vec<(String, String)> = vec![
            ("api-key".to_string(), self.api_key.clone()),
            ("format".to_string(), "json".to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        params.extend(filter.to_query_params());

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let envelope: ResourceEnvelope = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        tracing::debug!(
            "Fetched {} records for {}/{}/{}",
            envelope.records.len(),
            filter.state,
            filter.district,
            filter.commodity
        );

        Ok(envelope.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_decodes_records() {
        let json = r#"{
            "title": "Current Daily Price of Various Commodities",
            "count": 1,
            "records": [{
                "state": "NCT of Delhi",
                "district": "Delhi",
                "market": "Azadpur",
                "commodity": "Tomato",
                "variety": "Local",
                "arrival_date": "05/01/2024",
                "min_price": "1200",
                "max_price": "1700",
                "modal_price": "1450"
            }]
        }"#;

        let envelope: ResourceEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.records.len(), 1);
        assert_eq!(envelope.records[0].market, "Azadpur");
    }

    #[test]
    fn test_envelope_without_records_is_empty() {
        let envelope: ResourceEnvelope = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(envelope.records.is_empty());
    }
}
