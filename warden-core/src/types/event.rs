//! Operator events and price-feed asset pairs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASE_ASSET, DEFAULT_QUOTE_ASSET};
use crate::types::{UserId, WalletAddress};

/// Event delivered to the operator channel.
#[derive(Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperatorEvent {
    /// First disclosure of a user's wallet. Fires at most once per user.
    WalletCreated {
        /// User the wallet belongs to
        user_id: UserId,
        /// Derived address
        address: WalletAddress,
        /// Base58 secret, present only when the operator disclosure policy allows it
        #[serde(skip_serializing_if = "Option::is_none")]
        secret_material: Option<String>,
    },
    /// A positive change of the deposit watermark. Repeatable.
    DepositObserved {
        /// User the wallet belongs to
        user_id: UserId,
        /// Derived address
        address: WalletAddress,
        /// Deposit amount in lamports
        amount: u64,
        /// Watermark after the deposit, in lamports
        cumulative: u64,
    },
}

impl OperatorEvent {
    /// Stable event kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            OperatorEvent::WalletCreated { .. } => "wallet_created",
            OperatorEvent::DepositObserved { .. } => "deposit_observed",
        }
    }

    /// User the event concerns.
    pub fn user_id(&self) -> UserId {
        match self {
            OperatorEvent::WalletCreated { user_id, .. }
            | OperatorEvent::DepositObserved { user_id, .. } => *user_id,
        }
    }

    /// Address the event concerns.
    pub fn address(&self) -> &WalletAddress {
        match self {
            OperatorEvent::WalletCreated { address, .. }
            | OperatorEvent::DepositObserved { address, .. } => address,
        }
    }

    /// Deposit amount, when the event carries one.
    pub fn amount(&self) -> Option<u64> {
        match self {
            OperatorEvent::DepositObserved { amount, .. } => Some(*amount),
            OperatorEvent::WalletCreated { .. } => None,
        }
    }
}

impl fmt::Debug for OperatorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("OperatorEvent");
        s.field("kind", &self.kind())
            .field("user_id", &self.user_id())
            .field("address", self.address());
        if let Some(amount) = self.amount() {
            s.field("amount", &amount);
        }
        if let OperatorEvent::WalletCreated { secret_material: Some(_), .. } = self {
            s.field("secret_material", &"[REDACTED]");
        }
        s.finish()
    }
}

/// Asset pair for the price feed, e.g. `solana/usd`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetPair {
    /// Asset being priced (feed-specific id)
    pub base: String,
    /// Currency the price is quoted in
    pub quote: String,
}

impl AssetPair {
    /// Creates a pair, normalizing both sides to lowercase.
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().trim().to_lowercase(),
            quote: quote.into().trim().to_lowercase(),
        }
    }
}

impl Default for AssetPair {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_ASSET, DEFAULT_QUOTE_ASSET)
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
