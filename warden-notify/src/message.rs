//! Operator message rendering.

use warden_core::types::{format_sol, OperatorEvent};

/// Renders an event as Telegram HTML.
///
/// Secret material appears only if the event carries it, which the session
/// does only when the operator disclosure policy allows it.
pub fn render_event(event: &OperatorEvent) -> String {
    match event {
        OperatorEvent::WalletCreated {
            user_id,
            address,
            secret_material,
        } => {
            let mut text = format!(
                "🆕 <b>Wallet created</b>\nUser: <code>{}</code>\nAddress: <code>{}</code>",
                user_id, address
            );
            if let Some(secret) = secret_material {
                text.push_str(&format!("\nSecret: <code>{}</code>", secret));
            }
            text
        }
        OperatorEvent::DepositObserved {
            user_id,
            address,
            amount,
            cumulative,
        } => format!(
            "💰 <b>Deposit observed</b>\nUser: <code>{}</code>\nAddress: <code>{}</code>\nAmount: {} SOL\nTotal: {} SOL",
            user_id,
            address,
            format_sol(*amount),
            format_sol(*cumulative)
        ),
    }
}
