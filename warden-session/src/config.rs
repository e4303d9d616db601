//! Process configuration loaded from the environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use warden_core::constants::{
    DEFAULT_ORACLE_TIMEOUT_SECS, DEFAULT_PRICE_URL, DEFAULT_SOLANA_RPC_URL,
    DEFAULT_TELEGRAM_API_URL,
};
use warden_core::error::{Result, WardenError};
use warden_core::types::{AssetPair, DisclosurePolicy, MasterSecret};
use warden_crypto::DerivationScheme;

/// Default directory for the durable stores.
pub const DEFAULT_DATA_DIR: &str = "./warden-data";

/// Telegram operator channel settings.
#[derive(Clone)]
pub struct TelegramSettings {
    /// Bot API base URL
    pub api_url: String,
    /// Bot token (secret)
    pub bot_token: String,
    /// Admin group chat id
    pub chat_id: i64,
}

impl fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("api_url", &self.api_url)
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Everything the session needs at startup.
///
/// Loading fails with `ConfigError` when the master secret is missing, so a
/// misconfigured process never serves a single request.
#[derive(Debug)]
pub struct WardenConfig {
    /// Master secret every wallet derives from
    pub master_secret: MasterSecret,
    /// Derivation scheme
    pub derivation: DerivationScheme,
    /// Solana JSON-RPC endpoint
    pub rpc_url: String,
    /// Simple-price endpoint
    pub price_url: String,
    /// Pair priced for the USD equivalent
    pub asset_pair: AssetPair,
    /// Bound on each oracle call, in seconds
    pub oracle_timeout_secs: u64,
    /// Directory holding the ledger, gate and journal files
    pub data_dir: PathBuf,
    /// Telegram channel; `None` falls back to the log notifier
    pub telegram: Option<TelegramSettings>,
    /// Who may see secret material
    pub disclosure: DisclosurePolicy,
}

impl WardenConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (secret_value, secret_setting) = match lookup("WARDEN_MASTER_SECRET") {
            Some(value) => (Some(value), "WARDEN_MASTER_SECRET"),
            None => (lookup("MNEMONIC"), "WARDEN_MASTER_SECRET (or MNEMONIC)"),
        };
        let master_secret = MasterSecret::from_optional(secret_value, secret_setting)?;

        let derivation = match lookup("WARDEN_DERIVATION") {
            Some(value) => DerivationScheme::from_str(&value)?,
            None => DerivationScheme::default(),
        };

        let oracle_timeout_secs = match lookup("WARDEN_ORACLE_TIMEOUT_SECS") {
            Some(value) => parse_timeout(&value)?,
            None => DEFAULT_ORACLE_TIMEOUT_SECS,
        };

        let telegram = match (lookup("TELEGRAM_BOT_TOKEN"), lookup("ADMIN_GROUP_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramSettings {
                api_url: lookup("TELEGRAM_API_URL")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.into()),
                bot_token,
                chat_id: chat_id.trim().parse().map_err(|_| {
                    WardenError::ConfigError(format!("ADMIN_GROUP_ID is not an integer: {}", chat_id))
                })?,
            }),
            (Some(_), None) | (None, Some(_)) => {
                warn!("Only one of TELEGRAM_BOT_TOKEN and ADMIN_GROUP_ID is set; using log notifier");
                None
            }
            (None, None) => None,
        };

        let disclosure = DisclosurePolicy {
            operator: parse_flag(&lookup, "WARDEN_DISCLOSE_TO_OPERATOR")?,
            user: parse_flag(&lookup, "WARDEN_DISCLOSE_TO_USER")?,
        };

        Ok(Self {
            master_secret,
            derivation,
            rpc_url: lookup("SOLANA_RPC_URL").unwrap_or_else(|| DEFAULT_SOLANA_RPC_URL.into()),
            price_url: lookup("WARDEN_PRICE_URL").unwrap_or_else(|| DEFAULT_PRICE_URL.into()),
            asset_pair: AssetPair::default(),
            oracle_timeout_secs,
            data_dir: lookup("WARDEN_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            telegram,
            disclosure,
        })
    }
}

fn parse_timeout(value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(WardenError::ConfigError(format!(
            "WARDEN_ORACLE_TIMEOUT_SECS must be a positive integer, got {:?}",
            value
        ))),
    }
}

fn parse_flag<F>(lookup: &F, key: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(false);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(WardenError::ConfigError(format!(
            "{} must be a boolean, got {:?}",
            key, other
        ))),
    }
}
