//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Wallets
        .route("/api/v1/wallets/:user_id", get(handlers::show_wallet))
        .route("/api/v1/wallets/:user_id/address", get(handlers::wallet_address))

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use warden_core::error::{Result, WardenError};
    use warden_core::traits::{BalanceSource, NotificationGate, PriceFeed};
    use warden_core::types::{AssetPair, MasterSecret, UserId, WalletAddress};
    use warden_crypto::{DerivationScheme, WalletDeriver};
    use warden_ledger::{MemoryGate, MemoryLedger};
    use warden_notify::LogNotifier;
    use warden_session::{DisclosurePolicy, WalletSession};

    struct FixedBalance(Option<u64>);

    #[async_trait]
    impl BalanceSource for FixedBalance {
        async fn get_live_balance(&self, _address: &WalletAddress) -> Result<u64> {
            self.0.ok_or_else(|| WardenError::Unavailable("rpc down".into()))
        }
    }

    struct FixedPrice;

    #[async_trait]
    impl PriceFeed for FixedPrice {
        async fn get_conversion_rate(&self, _pair: &AssetPair) -> Result<f64> {
            Ok(100.0)
        }
    }

    struct BrokenGate;

    #[async_trait]
    impl NotificationGate for BrokenGate {
        async fn try_consume(&self, _user: UserId) -> Result<bool> {
            Err(WardenError::PersistenceError("disk full".into()))
        }
        async fn rollback(&self, _user: UserId) -> Result<()> {
            Ok(())
        }
        async fn is_consumed(&self, _user: UserId) -> Result<bool> {
            Ok(false)
        }
        async fn count(&self) -> Result<u64> {
            Ok(0)
        }
    }

    fn deriver() -> WalletDeriver {
        WalletDeriver::new(MasterSecret::from_phrase("api test secret").unwrap(), DerivationScheme::Keyed)
    }

    fn session(balance: Option<u64>, gate: Arc<dyn NotificationGate>) -> WalletSession {
        WalletSession::new(
            deriver(),
            Arc::new(FixedBalance(balance)),
            Arc::new(FixedPrice),
            Arc::new(LogNotifier::new()),
            Arc::new(MemoryLedger::new()),
            gate,
        )
    }

    fn app(session: WalletSession) -> Router {
        create_router(Arc::new(AppState::new(session)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = get_json(app(session(Some(0), Arc::new(MemoryGate::new()))), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["derivation"], "keyed");
    }

    #[tokio::test]
    async fn test_show_wallet() {
        let (status, body) = get_json(
            app(session(Some(1_500_000_000), Arc::new(MemoryGate::new()))),
            "/api/v1/wallets/42",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], 42);
        assert_eq!(body["address"], deriver().address(UserId::new(42)).to_base58());
        assert_eq!(body["balance"]["status"], "known");
        assert_eq!(body["balance"]["cumulative_lamports"], 1_500_000_000u64);
        assert_eq!(body["cumulative_sol"], "1.5");
        assert_eq!(body["usd_equivalent"], 150.0);
        assert_eq!(body["deposit"]["delta_sol"], "1.5");
        assert!(body.get("secret").is_none());
    }

    #[tokio::test]
    async fn test_show_wallet_degraded() {
        let (status, body) =
            get_json(app(session(None, Arc::new(MemoryGate::new()))), "/api/v1/wallets/42").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance"]["status"], "unavailable");
        assert!(body["usd_equivalent"].is_null());
        assert!(body.get("cumulative_sol").is_none());
    }

    #[tokio::test]
    async fn test_show_wallet_with_user_disclosure() {
        let session = session(Some(0), Arc::new(MemoryGate::new()))
            .with_policy(DisclosurePolicy { operator: false, user: true });
        let (_, body) = get_json(app(session), "/api/v1/wallets/42").await;

        assert_eq!(
            body["secret"]["base58"],
            deriver().derive(UserId::new(42)).secret.to_base58()
        );
    }

    #[tokio::test]
    async fn test_address_route() {
        let (status, body) = get_json(
            app(session(None, Arc::new(MemoryGate::new()))),
            "/api/v1/wallets/-1002/address",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["address"], deriver().address(UserId::new(-1002)).to_base58());
    }

    #[tokio::test]
    async fn test_invalid_user_id() {
        let (status, body) =
            get_json(app(session(Some(0), Arc::new(MemoryGate::new()))), "/api/v1/wallets/alice").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_store_failure_is_503() {
        let (status, body) = get_json(app(session(Some(0), Arc::new(BrokenGate))), "/api/v1/wallets/42").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "STORE_UNAVAILABLE");
    }
}
