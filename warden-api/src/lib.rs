//! # Warden API Server
//!
//! HTTP surface consumed by the chat front end.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness and store counters
//! - `GET /api/v1/wallets/:user_id` - Show wallet (balance, deposit, USD value)
//! - `GET /api/v1/wallets/:user_id/address` - Deposit address only
//!
//! ## Example
//!
//! ```rust,ignore
//! use warden_api::ApiServer;
//! use warden_session::{WalletSession, WardenConfig};
//!
//! let session = WalletSession::from_config(WardenConfig::from_env()?).await?;
//! ApiServer::new(session).run(([127, 0, 0, 1], 3001)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use dto::{AddressResponse, HealthResponse, WalletResponse};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use warden_session::WalletSession;

/// API server for Warden.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server around a ready session.
    pub fn new(session: WalletSession) -> Self {
        Self {
            state: Arc::new(AppState::new(session)),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("Warden API server listening on {}", addr);

        axum::serve(listener, self.router()).await
    }
}
