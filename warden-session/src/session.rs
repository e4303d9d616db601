//! The wallet session facade.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use warden_core::constants::{
    DEFAULT_ORACLE_TIMEOUT_SECS, GATE_FILE_NAME, JOURNAL_FILE_NAME, LEDGER_FILE_NAME,
};
use warden_core::error::{Result, WardenError};
use warden_core::traits::{
    BalanceSource, DepositLedger, NotificationGate, OperatorNotifier, PriceFeed,
};
use warden_core::types::{
    lamports_to_sol, AssetPair, BalanceStatus, DepositReceipt, DerivedWallet, DisclosurePolicy,
    OperatorEvent, Reconciliation, UserId, WalletAddress, WalletView,
};
use warden_crypto::{DerivationScheme, WalletDeriver};
use warden_ledger::{AddressJournal, FileGate, FileLedger};
use warden_notify::{LogNotifier, TelegramConfig, TelegramNotifier};
use warden_oracle::{HttpPriceFeed, PriceFeedConfig, SolanaRpcClient, SolanaRpcConfig};

use crate::config::WardenConfig;
use crate::lock::KeyedMutex;

/// Composes derivation, balance lookup, ledger, gate and notifier for one
/// user-initiated request.
pub struct WalletSession {
    deriver: WalletDeriver,
    balances: Arc<dyn BalanceSource>,
    prices: Arc<dyn PriceFeed>,
    notifier: Arc<dyn OperatorNotifier>,
    ledger: Arc<dyn DepositLedger>,
    gate: Arc<dyn NotificationGate>,
    journal: Option<AddressJournal>,
    policy: DisclosurePolicy,
    asset_pair: AssetPair,
    oracle_timeout: Duration,
    locks: KeyedMutex<UserId>,
}

/// Store counters for health reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Users with a ledger entry
    pub tracked_wallets: u64,
    /// Users whose wallet was disclosed to the operator
    pub disclosed_wallets: u64,
}

/// State mutations committed under the per-user lock.
struct Committed {
    /// The reconciled balance, or why the balance could not be read
    observed: Result<Observed>,
    first_disclosure: bool,
}

/// A live balance read and the ledger update it produced.
struct Observed {
    live: u64,
    reconciliation: Reconciliation,
}

impl WalletSession {
    /// Creates a session from its collaborators.
    ///
    /// Disclosure is closed, there is no journal and the oracle timeout is
    /// the default until the `with_*` methods say otherwise.
    pub fn new(
        deriver: WalletDeriver,
        balances: Arc<dyn BalanceSource>,
        prices: Arc<dyn PriceFeed>,
        notifier: Arc<dyn OperatorNotifier>,
        ledger: Arc<dyn DepositLedger>,
        gate: Arc<dyn NotificationGate>,
    ) -> Self {
        Self {
            deriver,
            balances,
            prices,
            notifier,
            ledger,
            gate,
            journal: None,
            policy: DisclosurePolicy::default(),
            asset_pair: AssetPair::default(),
            oracle_timeout: Duration::from_secs(DEFAULT_ORACLE_TIMEOUT_SECS),
            locks: KeyedMutex::new(),
        }
    }

    /// Sets the disclosure policy.
    pub fn with_policy(mut self, policy: DisclosurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Journals every address served.
    pub fn with_journal(mut self, journal: AddressJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Sets the pair priced for the USD equivalent.
    pub fn with_asset_pair(mut self, pair: AssetPair) -> Self {
        self.asset_pair = pair;
        self
    }

    /// Sets the bound on each oracle call.
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Builds the production session: file stores under `data_dir`, the
    /// Solana RPC balance source, the HTTP price feed and the configured
    /// operator channel.
    pub async fn from_config(config: WardenConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir).await.map_err(|e| {
            WardenError::PersistenceError(format!(
                "failed to create data directory {}: {}",
                config.data_dir.display(),
                e
            ))
        })?;

        let ledger = FileLedger::open(config.data_dir.join(LEDGER_FILE_NAME)).await?;
        let gate = FileGate::open(config.data_dir.join(GATE_FILE_NAME)).await?;
        let journal = AddressJournal::new(config.data_dir.join(JOURNAL_FILE_NAME));

        let balances = SolanaRpcClient::with_config(SolanaRpcConfig {
            rpc_url: config.rpc_url.clone(),
            timeout_seconds: config.oracle_timeout_secs,
            ..Default::default()
        })?;
        let prices = HttpPriceFeed::with_config(PriceFeedConfig {
            url: config.price_url.clone(),
            timeout_seconds: config.oracle_timeout_secs,
        })?;

        let notifier: Arc<dyn OperatorNotifier> = match &config.telegram {
            Some(telegram) => {
                let mut telegram_config =
                    TelegramConfig::new(telegram.bot_token.clone(), telegram.chat_id);
                telegram_config.api_url = telegram.api_url.clone();
                info!(chat_id = telegram.chat_id, "Operator channel: Telegram");
                Arc::new(TelegramNotifier::with_config(telegram_config)?)
            }
            None => {
                info!("Operator channel: log");
                Arc::new(LogNotifier::new())
            }
        };

        info!(
            scheme = %config.derivation,
            data_dir = %config.data_dir.display(),
            disclose_to_operator = config.disclosure.operator,
            disclose_to_user = config.disclosure.user,
            "Wallet session ready"
        );

        Ok(Self::new(
            WalletDeriver::new(config.master_secret, config.derivation),
            Arc::new(balances),
            Arc::new(prices),
            notifier,
            Arc::new(ledger),
            Arc::new(gate),
        )
        .with_policy(config.disclosure)
        .with_journal(journal)
        .with_asset_pair(config.asset_pair)
        .with_oracle_timeout(Duration::from_secs(config.oracle_timeout_secs)))
    }

    /// Returns the disclosure policy.
    pub fn policy(&self) -> DisclosurePolicy {
        self.policy
    }

    /// Returns the derivation scheme in use.
    pub fn scheme(&self) -> DerivationScheme {
        self.deriver.scheme()
    }

    /// Reads the store counters.
    pub async fn stats(&self) -> Result<SessionStats> {
        Ok(SessionStats {
            tracked_wallets: self.ledger.count().await?,
            disclosed_wallets: self.gate.count().await?,
        })
    }

    /// Derives only the public address. No balance, ledger or gate access.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn address_of(&self, user: UserId) -> WalletAddress {
        let address = self.deriver.address(user);
        self.journal_address(user, &address).await;
        address
    }

    /// Runs the full "show my wallet" operation for one user.
    ///
    /// Oracle failures degrade the view (balance unavailable) and skip the
    /// ledger. Store persistence failures abort the request with nothing
    /// applied. Notification failures never fail the request; a rejected
    /// `wallet_created` delivery reopens the gate.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn show_wallet(&self, user: UserId) -> Result<WalletView> {
        let wallet = self.deriver.derive(user);
        self.journal_address(user, &wallet.address).await;

        let live = self
            .bounded("balance lookup", self.balances.get_live_balance(&wallet.address))
            .await;
        if let Err(e) = &live {
            warn!(error = %e, "Balance unavailable, ledger not reconciled");
        }

        let committed = self.commit(user, live).await?;

        if committed.first_disclosure {
            self.announce_wallet(user, &wallet).await;
        }

        let deposit = committed
            .observed
            .as_ref()
            .ok()
            .and_then(|o| DepositReceipt::from_reconciliation(&o.reconciliation));
        if let Some(receipt) = &deposit {
            self.announce_deposit(user, &wallet.address, receipt).await;
        }

        let balance = match &committed.observed {
            Ok(o) => BalanceStatus::Known {
                cumulative_lamports: o.reconciliation.cumulative,
                live_lamports: o.live,
            },
            Err(e) => BalanceStatus::Unavailable {
                reason: e.to_string(),
            },
        };

        let usd_equivalent = match balance.cumulative_lamports() {
            Some(lamports) => self.usd_value(lamports).await,
            None => None,
        };

        let secret = self.policy.user.then(|| wallet.secret.export());

        Ok(WalletView {
            user_id: user,
            address: wallet.address,
            balance,
            usd_equivalent,
            deposit,
            secret,
        })
    }

    /// Consumes the gate and reconciles the ledger under the user's lock.
    ///
    /// The gate goes first so a failed ledger write can be compensated by
    /// reopening it; either both commit or neither does.
    async fn commit(&self, user: UserId, live: Result<u64>) -> Result<Committed> {
        let _guard = self.locks.lock(user).await;

        let first_disclosure = self.gate.try_consume(user).await?;

        let observed = match live {
            Ok(lamports) => match self.ledger.reconcile(user, lamports).await {
                Ok(reconciliation) => Ok(Observed {
                    live: lamports,
                    reconciliation,
                }),
                Err(e) => {
                    if first_disclosure {
                        self.reopen_gate(user).await;
                    }
                    return Err(e);
                }
            },
            Err(e) => Err(e),
        };

        Ok(Committed {
            observed,
            first_disclosure,
        })
    }

    /// Sends the one-time disclosure.
    ///
    /// The gate is reopened only when the channel rejected the event. After a
    /// timeout or transport error the event may have arrived, so the gate
    /// stays consumed and the disclosure is never repeated.
    async fn announce_wallet(&self, user: UserId, wallet: &DerivedWallet) {
        let event = OperatorEvent::WalletCreated {
            user_id: user,
            address: wallet.address,
            secret_material: self.policy.operator.then(|| wallet.secret.to_base58()),
        };

        match self.notifier.notify(&event).await {
            Ok(()) => info!(address = %wallet.address, "Wallet disclosed to operator"),
            Err(e) if e.is_delivery_rejection() => {
                warn!(error = %e, "Wallet disclosure rejected, reopening gate");
                let _guard = self.locks.lock(user).await;
                self.reopen_gate(user).await;
            }
            Err(e) => {
                error!(
                    address = %wallet.address,
                    error = %e,
                    "Wallet disclosure outcome unknown, gate stays consumed"
                );
            }
        }
    }

    async fn reopen_gate(&self, user: UserId) {
        if let Err(e) = self.gate.rollback(user).await {
            // The user stays marked: the disclosure is lost, never repeated.
            error!(user = %user, error = %e, "Gate rollback failed");
        }
    }

    async fn announce_deposit(
        &self,
        user: UserId,
        address: &WalletAddress,
        receipt: &DepositReceipt,
    ) {
        info!(
            delta = receipt.delta,
            prior = receipt.prior,
            cumulative = receipt.cumulative,
            "Deposit observed"
        );

        let event = OperatorEvent::DepositObserved {
            user_id: user,
            address: *address,
            amount: receipt.delta,
            cumulative: receipt.cumulative,
        };
        if let Err(e) = self.notifier.notify(&event).await {
            warn!(error = %e, "Deposit notification failed");
        }
    }

    async fn usd_value(&self, lamports: u64) -> Option<f64> {
        match self
            .bounded("price lookup", self.prices.get_conversion_rate(&self.asset_pair))
            .await
        {
            Ok(rate) => Some(lamports_to_sol(lamports) * rate),
            Err(e) => {
                warn!(pair = %self.asset_pair, error = %e, "Price unavailable");
                None
            }
        }
    }

    async fn journal_address(&self, user: UserId, address: &WalletAddress) {
        if let Some(journal) = &self.journal {
            if let Err(e) = journal.record(user, address).await {
                warn!(user = %user, error = %e, "Address journal write failed");
            }
        }
    }

    /// Bounds an oracle call by the configured timeout.
    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.oracle_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                debug!(operation, "Oracle call timed out");
                Err(WardenError::timeout(operation, self.oracle_timeout.as_secs()))
            }
        }
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("deriver", &self.deriver)
            .field("policy", &self.policy)
            .field("asset_pair", &self.asset_pair)
            .field("oracle_timeout", &self.oracle_timeout)
            .finish_non_exhaustive()
    }
}
