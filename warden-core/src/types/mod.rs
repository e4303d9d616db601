//! Domain types for Warden.
//!
//! - [`UserId`]: Front-end supplied stable user identifier
//! - [`MasterSecret`]: Process-wide derivation secret
//! - [`DerivedWallet`]: Address + secret material recomputed on demand
//! - [`Reconciliation`]: Outcome of comparing a live balance with the ledger
//! - [`WalletView`]: View model returned to the front end
//! - [`OperatorEvent`]: Events sent to the operator channel

mod user;
mod secret;
mod wallet;
mod ledger;
mod event;
mod view;

pub use user::*;
pub use secret::*;
pub use wallet::*;
pub use ledger::*;
pub use event::*;
pub use view::*;
