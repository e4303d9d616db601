//! Simple-price conversion feed.
//!
//! Speaks the CoinGecko `simple/price` shape:
//! `GET {url}?ids=solana&vs_currencies=usd` → `{"solana":{"usd":142.5}}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use warden_core::constants::{DEFAULT_ORACLE_TIMEOUT_SECS, DEFAULT_PRICE_URL};
use warden_core::error::{Result, WardenError};
use warden_core::traits::PriceFeed;
use warden_core::types::AssetPair;

use crate::http::{build_client, map_transport_error};

/// Price feed configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    /// Simple-price endpoint
    pub url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PRICE_URL.into(),
            timeout_seconds: DEFAULT_ORACLE_TIMEOUT_SECS,
        }
    }
}

/// HTTP price feed.
#[derive(Debug)]
pub struct HttpPriceFeed {
    config: PriceFeedConfig,
    http_client: reqwest::Client,
}

impl HttpPriceFeed {
    /// Creates a feed for the given endpoint.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_config(PriceFeedConfig {
            url: url.into(),
            ..Default::default()
        })
    }

    /// Creates a feed with custom configuration.
    pub fn with_config(config: PriceFeedConfig) -> Result<Self> {
        let http_client = build_client(config.timeout_seconds)?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    #[instrument(skip(self), fields(pair = %pair))]
    async fn get_conversion_rate(&self, pair: &AssetPair) -> Result<f64> {
        let operation = "price lookup";
        let response = self
            .http_client
            .get(&self.config.url)
            .query(&[("ids", pair.base.as_str()), ("vs_currencies", pair.quote.as_str())])
            .send()
            .await
            .map_err(|e| map_transport_error(operation, self.config.timeout_seconds, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WardenError::Unavailable(format!(
                "price feed returned HTTP {}",
                status
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| map_transport_error(operation, self.config.timeout_seconds, e))?;

        let rate = json
            .get(&pair.base)
            .and_then(|v| v.get(&pair.quote))
            .and_then(|v| v.as_f64())
            .ok_or_else(|| WardenError::Unavailable(format!("no price for {}", pair)))?;

        if !rate.is_finite() || rate < 0.0 {
            return Err(WardenError::Unavailable(format!("invalid price {} for {}", rate, pair)));
        }

        debug!(rate, "Price fetched");
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn feed_for(server: &MockServer) -> HttpPriceFeed {
        HttpPriceFeed::with_config(PriceFeedConfig {
            url: format!("{}/simple/price", server.uri()),
            timeout_seconds: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_rate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("ids", "solana"))
            .and(query_param("vs_currencies", "usd"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "solana": { "usd": 142.5 } })),
            )
            .mount(&server)
            .await;

        let feed = feed_for(&server).await;
        let rate = feed.get_conversion_rate(&AssetPair::default()).await.unwrap();
        assert!((rate - 142.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_pair_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let feed = feed_for(&server).await;
        let err = feed.get_conversion_rate(&AssetPair::default()).await.unwrap_err();
        assert!(matches!(err, WardenError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_rate_limited_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let feed = feed_for(&server).await;
        assert!(feed.get_conversion_rate(&AssetPair::default()).await.unwrap_err().is_recoverable());
    }

    #[tokio::test]
    async fn test_slow_feed_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "solana": { "usd": 1.0 } }))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let feed = feed_for(&server).await;
        let err = feed.get_conversion_rate(&AssetPair::default()).await.unwrap_err();
        assert!(matches!(err, WardenError::Timeout { .. }));
    }
}
