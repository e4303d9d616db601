//! Tracing-backed notifier.

use async_trait::async_trait;
use tracing::info;

use warden_core::error::Result;
use warden_core::traits::OperatorNotifier;
use warden_core::types::OperatorEvent;

/// Notifier that writes each event to the log and always succeeds.
///
/// Secret material is never logged, only whether the event carried it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    /// Creates a log notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OperatorNotifier for LogNotifier {
    async fn notify(&self, event: &OperatorEvent) -> Result<()> {
        match event {
            OperatorEvent::WalletCreated {
                user_id,
                address,
                secret_material,
            } => info!(
                kind = event.kind(),
                user = %user_id,
                address = %address,
                secret_included = secret_material.is_some(),
                "Operator event"
            ),
            OperatorEvent::DepositObserved {
                user_id,
                address,
                amount,
                cumulative,
            } => info!(
                kind = event.kind(),
                user = %user_id,
                address = %address,
                amount,
                cumulative,
                "Operator event"
            ),
        }
        Ok(())
    }
}
