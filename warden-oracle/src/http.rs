//! Shared HTTP client construction and error mapping.

use std::time::Duration;

use warden_core::error::{Result, WardenError};

/// Builds a client whose every request is bounded by `timeout_seconds`.
pub(crate) fn build_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| WardenError::ConfigError(format!("failed to create HTTP client: {}", e)))
}

/// Maps a transport failure onto the collaborator error taxonomy.
pub(crate) fn map_transport_error(
    operation: &str,
    timeout_seconds: u64,
    error: reqwest::Error,
) -> WardenError {
    if error.is_timeout() {
        WardenError::timeout(operation, timeout_seconds)
    } else {
        WardenError::Unavailable(format!("{} failed: {}", operation, error))
    }
}
