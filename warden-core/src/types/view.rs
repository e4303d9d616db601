//! View model returned to the front end, and the disclosure policy that
//! decides whether it carries secret material.

use serde::{Deserialize, Serialize};

use crate::constants::LAMPORTS_PER_SOL;
use crate::types::{Reconciliation, SecretExport, UserId, WalletAddress};

// ═══════════════════════════════════════════════════════════════════════════════
// AMOUNTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Converts lamports to SOL for display. Not used for ledger arithmetic.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Formats lamports as an exact decimal SOL string (trailing zeros trimmed).
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:09}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

// ═══════════════════════════════════════════════════════════════════════════════
// DISCLOSURE POLICY
// ═══════════════════════════════════════════════════════════════════════════════

/// Who may see a wallet's secret material.
///
/// Both switches default to off. The operator switch controls the one-time
/// `wallet_created` event; the user switch controls the view model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosurePolicy {
    /// Include the secret in the one-time operator event
    pub operator: bool,
    /// Include the secret in the view returned to the front end
    pub user: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// VIEW MODEL
// ═══════════════════════════════════════════════════════════════════════════════

/// Balance part of the view.
///
/// `Unavailable` is never rendered as zero: a zero here would later look
/// like a jump from 0 to the real balance.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BalanceStatus {
    /// Authoritative balance read and reconciled
    Known {
        /// Lifetime deposit watermark, lamports
        cumulative_lamports: u64,
        /// Live balance just read, lamports
        live_lamports: u64,
    },
    /// Balance temporarily unknown; try again
    Unavailable {
        /// Human-readable cause
        reason: String,
    },
}

impl BalanceStatus {
    /// Cumulative balance, if known.
    pub fn cumulative_lamports(&self) -> Option<u64> {
        match self {
            BalanceStatus::Known { cumulative_lamports, .. } => Some(*cumulative_lamports),
            BalanceStatus::Unavailable { .. } => None,
        }
    }

    /// True when the balance was read.
    pub fn is_known(&self) -> bool {
        matches!(self, BalanceStatus::Known { .. })
    }
}

/// A deposit detected during this request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DepositReceipt {
    /// Deposit amount, lamports
    pub delta: u64,
    /// Watermark before the deposit, lamports
    pub prior: u64,
    /// Watermark after the deposit, lamports
    pub cumulative: u64,
}

impl DepositReceipt {
    /// Builds a receipt from a reconciliation, if it detected a deposit.
    pub fn from_reconciliation(r: &Reconciliation) -> Option<Self> {
        r.is_deposit().then_some(Self {
            delta: r.delta,
            prior: r.prior,
            cumulative: r.cumulative,
        })
    }
}

/// Result of `show_wallet`.
#[derive(Clone, Debug, Serialize)]
pub struct WalletView {
    /// User the wallet belongs to
    pub user_id: UserId,
    /// Derived public address
    pub address: WalletAddress,
    /// Cumulative balance or the reason it is unknown
    pub balance: BalanceStatus,
    /// USD value of the cumulative balance; absent when balance or price is unknown
    pub usd_equivalent: Option<f64>,
    /// Deposit detected by this call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<DepositReceipt>,
    /// Secret material, only when the user disclosure policy permits it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretExport>,
}

impl WalletView {
    /// Cumulative balance in SOL for display, if known.
    pub fn cumulative_sol(&self) -> Option<f64> {
        self.balance.cumulative_lamports().map(lamports_to_sol)
    }
}
