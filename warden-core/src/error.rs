//! Error types for Warden.
//!
//! The taxonomy separates fatal startup problems (configuration), transient
//! collaborator failures (timeouts, unavailable services) and durable store
//! failures (persistence). Callers branch on the classification helpers
//! rather than on individual variants.

use thiserror::Error;

/// Result type alias using `WardenError`.
pub type Result<T> = std::result::Result<T, WardenError>;

/// Main error type for all Warden operations.
#[derive(Debug, Error)]
pub enum WardenError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Missing or invalid startup configuration (e.g. no master secret).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // DERIVATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Key expansion or address encoding failed.
    #[error("Key derivation failed: {0}")]
    DerivationError(String),

    /// Invalid key size or format.
    #[error("Invalid key: expected {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    /// Invalid wallet address encoding.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // COLLABORATOR ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// An external query did not answer within its bound.
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    /// An external service answered but could not provide a value.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// RPC call returned an error object.
    #[error("RPC call failed: {0}")]
    RpcError(String),

    /// The operator channel rejected the notification; it was not delivered.
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // PERSISTENCE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A durable store write or read failed; nothing was applied.
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// Store file has an unexpected format version.
    #[error("Store version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl WardenError {
    /// Creates a timeout error for the named operation.
    pub fn timeout(operation: impl Into<String>, seconds: u64) -> Self {
        WardenError::Timeout {
            operation: operation.into(),
            seconds,
        }
    }

    /// Returns true if this error is transient (the caller may retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WardenError::Timeout { .. }
                | WardenError::Unavailable(_)
                | WardenError::HttpError(_)
                | WardenError::RpcError(_)
        )
    }

    /// Returns true if this error must stop the process at startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, WardenError::ConfigError(_))
    }

    /// Returns true if a durable store failed.
    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            WardenError::PersistenceError(_)
                | WardenError::VersionMismatch { .. }
                | WardenError::IoError(_)
        )
    }

    /// Returns true if a notification was definitively not delivered.
    ///
    /// Timeouts and transport errors are ambiguous: the message may have
    /// arrived.
    pub fn is_delivery_rejection(&self) -> bool {
        matches!(self, WardenError::DeliveryFailed(_))
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            WardenError::ValidationError(_)
                | WardenError::InvalidAddress(_)
                | WardenError::InvalidKeySize { .. }
        )
    }
}
