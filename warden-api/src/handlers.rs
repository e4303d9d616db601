//! API route handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use warden_core::types::UserId;

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

fn parse_user(raw: &str) -> Result<UserId> {
    UserId::from_str(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// GET /api/v1/wallets/:user_id
pub async fn show_wallet(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<WalletResponse>> {
    let user = parse_user(&user_id)?;
    let view = state.session.show_wallet(user).await?;

    debug!(user = %user, known = view.balance.is_known(), "Wallet shown");
    Ok(Json(WalletResponse::from(view)))
}

/// GET /api/v1/wallets/:user_id/address
pub async fn wallet_address(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<AddressResponse>> {
    let user = parse_user(&user_id)?;
    let address = state.session.address_of(user).await;

    Ok(Json(AddressResponse {
        user_id: user,
        address,
    }))
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>> {
    let stats = state.session.stats().await?;

    Ok(Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        derivation: state.session.scheme().to_string(),
        tracked_wallets: stats.tracked_wallets,
        disclosed_wallets: stats.disclosed_wallets,
    }))
}
