//! # Warden Oracle
//!
//! Read-only adapters for the external services the session consults:
//!
//! - [`SolanaRpcClient`]: confirmed balance of an address via Solana JSON-RPC
//! - [`HttpPriceFeed`]: conversion rate via a CoinGecko-style simple-price API
//!
//! Both bound every request with a timeout and report failures as
//! `Timeout` or `Unavailable`. Neither ever substitutes a zero.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod http;
mod price;
mod solana;

pub use price::{HttpPriceFeed, PriceFeedConfig};
pub use solana::{SolanaRpcClient, SolanaRpcConfig};

pub use warden_core::traits::{BalanceSource, PriceFeed};
