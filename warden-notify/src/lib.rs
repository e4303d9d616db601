//! # Warden Notify
//!
//! Operator channels for wallet-creation and deposit events.
//!
//! - [`TelegramNotifier`]: posts to an admin group through the Bot API
//! - [`LogNotifier`]: writes events to the tracing log (development, or when
//!   no channel is configured)
//!
//! Only `DeliveryFailed` means the channel refused an event. A timeout or
//! transport error returned after the last retry leaves delivery unknown.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod log;
mod message;
mod telegram;

pub use log::LogNotifier;
pub use message::render_event;
pub use telegram::{TelegramConfig, TelegramNotifier};

pub use warden_core::traits::OperatorNotifier;
