//! DTOs for API responses.

use serde::Serialize;
use warden_core::types::{
    format_sol, BalanceStatus, DepositReceipt, SecretExport, UserId, WalletAddress, WalletView,
};

/// Response for the show-wallet route.
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    /// User the wallet belongs to
    pub user_id: UserId,
    /// Deposit address (base58)
    pub address: WalletAddress,
    /// Balance in lamports, or why it is unknown
    pub balance: BalanceStatus,
    /// Cumulative balance in SOL, formatted exactly; absent when unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_sol: Option<String>,
    /// USD value of the cumulative balance
    pub usd_equivalent: Option<f64>,
    /// Deposit detected by this request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<DepositDto>,
    /// Secret material - HANDLE WITH CARE (present only when disclosure is on)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretExport>,
}

/// A detected deposit.
#[derive(Debug, Serialize)]
pub struct DepositDto {
    /// Deposit amount, lamports
    pub delta_lamports: u64,
    /// Deposit amount, SOL
    pub delta_sol: String,
    /// Watermark after the deposit, lamports
    pub cumulative_lamports: u64,
}

impl From<DepositReceipt> for DepositDto {
    fn from(receipt: DepositReceipt) -> Self {
        Self {
            delta_lamports: receipt.delta,
            delta_sol: format_sol(receipt.delta),
            cumulative_lamports: receipt.cumulative,
        }
    }
}

impl From<WalletView> for WalletResponse {
    fn from(view: WalletView) -> Self {
        Self {
            user_id: view.user_id,
            address: view.address,
            cumulative_sol: view.balance.cumulative_lamports().map(format_sol),
            balance: view.balance,
            usd_equivalent: view.usd_equivalent,
            deposit: view.deposit.map(DepositDto::from),
            secret: view.secret,
        }
    }
}

/// Response for the address-only route.
#[derive(Debug, Serialize)]
pub struct AddressResponse {
    /// User the address belongs to
    pub user_id: UserId,
    /// Deposit address (base58)
    pub address: WalletAddress,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Derivation scheme in use
    pub derivation: String,
    /// Users with a ledger entry
    pub tracked_wallets: u64,
    /// Users disclosed to the operator
    pub disclosed_wallets: u64,
}
