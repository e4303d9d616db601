//! Constants for Warden.
//!
//! Key sizes follow Ed25519 as used by Solana. Domain separators and store
//! format tags are versioned so a future change never silently reinterprets
//! old data.

// ═══════════════════════════════════════════════════════════════════════════════
// ED25519 / SOLANA SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of the per-user seed fed into Ed25519 key expansion.
pub const SEED_SIZE: usize = 32;

/// Size of an Ed25519 public key (and therefore a Solana address) in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of the exported secret material: seed (32) || public key (32).
/// This is the layout of a Solana CLI keypair file.
pub const SECRET_MATERIAL_SIZE: usize = SEED_SIZE + PUBLIC_KEY_SIZE;

/// Shortest base58 encoding of a 32-byte key.
pub const ADDRESS_MIN_LEN: usize = 32;

/// Longest base58 encoding of a 32-byte key.
pub const ADDRESS_MAX_LEN: usize = 44;

// ═══════════════════════════════════════════════════════════════════════════════
// AMOUNTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Lamports in one SOL. Balances are tracked in lamports, the chain base unit.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// DOMAIN SEPARATORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Message prefix for keyed (HMAC) seed derivation.
pub const DOMAIN_WALLET_SEED: &[u8] = b"WARDEN_WALLET_SEED_V1";

/// Byte separating the domain prefix from the decimal user id.
/// It cannot occur in the decimal encoding of an id.
pub const DOMAIN_SEPARATOR_BYTE: u8 = 0x00;

/// Separator between secret and id in the legacy concatenation scheme.
pub const LEGACY_SEPARATOR: &[u8] = b":";

// ═══════════════════════════════════════════════════════════════════════════════
// PERSISTENCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Magic bytes of the deposit ledger snapshot file.
pub const LEDGER_FILE_MAGIC: &[u8; 4] = b"WLDG";

/// Magic bytes of the notification gate snapshot file.
pub const GATE_FILE_MAGIC: &[u8; 4] = b"WGTE";

/// Current snapshot format version.
pub const STORE_FORMAT_VERSION: u8 = 1;

/// Default file names inside the data directory.
pub const LEDGER_FILE_NAME: &str = "ledger.bin";
/// Notification gate snapshot file name.
pub const GATE_FILE_NAME: &str = "notified.bin";
/// Public address journal file name.
pub const JOURNAL_FILE_NAME: &str = "addresses.log";

// ═══════════════════════════════════════════════════════════════════════════════
// COLLABORATOR DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default Solana JSON-RPC endpoint.
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default simple-price endpoint (CoinGecko compatible).
pub const DEFAULT_PRICE_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Default base asset id for the price feed.
pub const DEFAULT_BASE_ASSET: &str = "solana";

/// Default quote currency for the price feed.
pub const DEFAULT_QUOTE_ASSET: &str = "usd";

/// Default bound on balance and price queries, in seconds.
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 10;

/// Default bound on operator notification delivery, in seconds.
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 15;
