//! Solana JSON-RPC balance source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use warden_core::constants::{DEFAULT_ORACLE_TIMEOUT_SECS, DEFAULT_SOLANA_RPC_URL};
use warden_core::error::{Result, WardenError};
use warden_core::traits::BalanceSource;
use warden_core::types::WalletAddress;

use crate::http::{build_client, map_transport_error};

/// Solana RPC client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolanaRpcConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Commitment level for balance reads
    pub commitment: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for SolanaRpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_SOLANA_RPC_URL.into(),
            commitment: "confirmed".into(),
            timeout_seconds: DEFAULT_ORACLE_TIMEOUT_SECS,
        }
    }
}

impl SolanaRpcConfig {
    /// Creates a configuration for the given endpoint.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }
}

/// Balance source backed by a Solana JSON-RPC node.
#[derive(Debug)]
pub struct SolanaRpcClient {
    config: SolanaRpcConfig,
    http_client: reqwest::Client,
}

impl SolanaRpcClient {
    /// Creates a client with the default configuration for `rpc_url`.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        Self::with_config(SolanaRpcConfig::new(rpc_url))
    }

    /// Creates a client with custom configuration.
    pub fn with_config(config: SolanaRpcConfig) -> Result<Self> {
        let http_client = build_client(config.timeout_seconds)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SolanaRpcConfig {
        &self.config
    }

    /// Makes a JSON-RPC call and returns its `result`.
    async fn rpc_call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let response = self
            .http_client
            .post(&self.config.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_transport_error(method, self.config.timeout_seconds, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WardenError::Unavailable(format!(
                "{} returned HTTP {}",
                method, status
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| map_transport_error(method, self.config.timeout_seconds, e))?;

        if let Some(error) = json.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown RPC error");
            warn!(method, error = %msg, "Solana RPC error");
            return Err(WardenError::RpcError(format!("{}: {}", method, msg)));
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| WardenError::RpcError(format!("{}: response has no result", method)))
    }
}

#[async_trait]
impl BalanceSource for SolanaRpcClient {
    #[instrument(skip(self), fields(address = %address))]
    async fn get_live_balance(&self, address: &WalletAddress) -> Result<u64> {
        let result = self
            .rpc_call(
                "getBalance",
                serde_json::json!([
                    address.to_base58(),
                    { "commitment": self.config.commitment }
                ]),
            )
            .await?;

        // Structure: { "context": { "slot": .. }, "value": <lamports> }
        let lamports = result
            .get("value")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| WardenError::RpcError("getBalance: missing value".into()))?;

        debug!(lamports, "Balance fetched");
        Ok(lamports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn address() -> WalletAddress {
        WalletAddress::from_array([7u8; 32])
    }

    async fn client_for(server: &MockServer, timeout_seconds: u64) -> SolanaRpcClient {
        SolanaRpcClient::with_config(SolanaRpcConfig {
            rpc_url: server.uri(),
            commitment: "confirmed".into(),
            timeout_seconds,
        })
        .unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = SolanaRpcConfig::default();
        assert_eq!(config.rpc_url, DEFAULT_SOLANA_RPC_URL);
        assert_eq!(config.commitment, "confirmed");
        assert_eq!(config.timeout_seconds, DEFAULT_ORACLE_TIMEOUT_SECS);
    }

    #[tokio::test]
    async fn test_get_balance() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "method": "getBalance",
                "params": [address().to_base58(), { "commitment": "confirmed" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "context": { "slot": 1 }, "value": 1_500_000_000u64 }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 5).await;
        assert_eq!(client.get_live_balance(&address()).await.unwrap(), 1_500_000_000);
    }

    #[tokio::test]
    async fn test_zero_balance_is_a_value() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "context": { "slot": 1 }, "value": 0 }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 5).await;
        assert_eq!(client.get_live_balance(&address()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rpc_error_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32602, "message": "Invalid param" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 5).await;
        let err = client.get_live_balance(&address()).await.unwrap_err();
        assert!(matches!(err, WardenError::RpcError(_)));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_http_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = client_for(&server, 5).await;
        let err = client.get_live_balance(&address()).await.unwrap_err();
        assert!(matches!(err, WardenError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_value_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "context": { "slot": 1 } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 5).await;
        assert!(client.get_live_balance(&address()).await.is_err());
    }

    #[tokio::test]
    async fn test_slow_node_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "result": { "value": 1 } }))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 1).await;
        let err = client.get_live_balance(&address()).await.unwrap_err();
        assert!(matches!(err, WardenError::Timeout { seconds: 1, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_unavailable() {
        let client = SolanaRpcClient::with_config(SolanaRpcConfig {
            rpc_url: "http://127.0.0.1:1".into(),
            commitment: "confirmed".into(),
            timeout_seconds: 2,
        })
        .unwrap();

        let err = client.get_live_balance(&address()).await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
