//! Deposit ledger results.

use serde::{Deserialize, Serialize};

/// Outcome of reconciling one observed balance against the ledger watermark.
///
/// `cumulative == max(prior, observed)` and `delta == cumulative - prior`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Watermark before the call, in lamports (0 for a new entry)
    pub prior: u64,
    /// Watermark after the call, in lamports
    pub cumulative: u64,
    /// Newly observed deposit, in lamports
    pub delta: u64,
}

impl Reconciliation {
    /// Computes the reconciliation of `observed` against `prior`.
    pub fn compute(prior: u64, observed: u64) -> Self {
        if observed > prior {
            Self {
                prior,
                cumulative: observed,
                delta: observed - prior,
            }
        } else {
            Self::unchanged(prior)
        }
    }

    /// A reconciliation that leaves the watermark where it is.
    pub fn unchanged(prior: u64) -> Self {
        Self {
            prior,
            cumulative: prior,
            delta: 0,
        }
    }

    /// True when a deposit was detected.
    pub fn is_deposit(&self) -> bool {
        self.delta > 0
    }
}
