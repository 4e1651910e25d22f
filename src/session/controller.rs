/// Session Controller - Orchestration Layer
///
/// Connects the wallet, mirrors the Bank contract's state into the session
/// store and dispatches deposit / withdraw / rename transactions, waiting for
/// each confirmation before re-synchronizing.
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ethers::types::{Address, TxHash, U256};
use serde::Serialize;
use tokio::sync::watch;

use super::state::{
    Balance, ConnectionState, ErrorReport, FormField, Operation, SessionSnapshot,
};
use super::store::{InFlightGuard, StateStore};
use crate::codec::{decode_bank_name, encode_bank_name, parse_amount};
use crate::config::{Backend, BankConfig};
use crate::error::BankError;
use crate::provider::{
    rpc, BankLedger, Confirmation, EthBankLedger, EthWallet, InMemoryLedger, PendingTx,
    StaticWallet, WalletProvider,
};

/// Account used by the mock backend, also the mock contract's owner
pub const MOCK_ACCOUNT: &str = "0xd427b183935D6Be800cE79C9B9CD6190e17f0c00";

/// Result of a confirmed state-changing call
#[derive(Debug, Clone, Serialize)]
pub struct TransactionOutcome {
    pub operation: Operation,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

impl TransactionOutcome {
    fn new(operation: Operation, confirmation: Confirmation) -> Self {
        Self {
            operation,
            tx_hash: confirmation.tx_hash,
            block_number: confirmation.block_number,
        }
    }
}

/// Outcome of a mount or refresh; each fetch fails independently
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub connected: bool,
    pub failures: Vec<ErrorReport>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.connected && self.failures.is_empty()
    }
}

/// Wallet and contract boundaries of a session
struct Remote {
    wallet: Arc<dyn WalletProvider>,
    ledger: Arc<dyn BankLedger>,
}

pub struct SessionController {
    remote: Option<Remote>,
    store: Arc<StateStore>,
    confirmation_timeout: Duration,
    install_prompt: String,
}

impl SessionController {
    // ============================================================================
    // Constructors
    // ============================================================================

    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        ledger: Arc<dyn BankLedger>,
        config: &BankConfig,
    ) -> Self {
        Self {
            remote: Some(Remote { wallet, ledger }),
            store: Arc::new(StateStore::new()),
            confirmation_timeout: config.confirmation_timeout,
            install_prompt: config.install_prompt.clone(),
        }
    }

    /// Session with no wallet provider present
    pub fn without_provider(config: &BankConfig) -> Self {
        Self {
            remote: None,
            store: Arc::new(StateStore::new()),
            confirmation_timeout: config.confirmation_timeout,
            install_prompt: config.install_prompt.clone(),
        }
    }

    /// Build the session for the configured backend
    pub fn from_config(config: &BankConfig) -> Result<Self, BankError> {
        match config.backend {
            Backend::Mock => {
                let account = Address::from_str(MOCK_ACCOUNT)
                    .map_err(|e| BankError::Config(format!("Invalid mock account: {}", e)))?;
                log::info!("🧪 Mock session for account {:?}", account);
                Ok(Self::new(
                    Arc::new(StaticWallet::new(vec![account])),
                    Arc::new(InMemoryLedger::new(account)),
                    config,
                ))
            }
            Backend::Rpc => match config.provider_url {
                Some(ref url) => {
                    let provider = rpc::connect_provider(url, config.poll_interval)?;
                    let ledger = EthBankLedger::new(
                        config.contract_address,
                        provider.clone(),
                        config.poll_interval,
                    )?;
                    Ok(Self::new(
                        Arc::new(EthWallet::new(provider)),
                        Arc::new(ledger),
                        config,
                    ))
                }
                None => Ok(Self::without_provider(config)),
            },
        }
    }

    // ============================================================================
    // State access
    // ============================================================================

    pub fn snapshot(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.store.subscribe()
    }

    pub fn connection(&self) -> ConnectionState {
        self.store.read(|s| s.connection.clone())
    }

    pub fn caller_address(&self) -> Option<Address> {
        self.store.read(|s| s.caller())
    }

    pub fn owner_address(&self) -> Option<Address> {
        self.store.read(|s| s.owner)
    }

    pub fn is_owner(&self) -> bool {
        self.store.read(|s| s.is_owner())
    }

    pub fn bank_name(&self) -> Option<String> {
        self.store.read(|s| s.bank_name.clone())
    }

    pub fn balance(&self) -> Option<U256> {
        self.store.read(|s| s.balance.map(|b| b.0))
    }

    pub fn error(&self) -> Option<ErrorReport> {
        self.store.read(|s| s.error.clone())
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Connect, then load the contract state if the wallet connected
    pub async fn mount(&self) -> RefreshReport {
        log::info!("🚀 Mounting bank session");
        if let Err(e) = self.connect().await {
            return RefreshReport {
                connected: false,
                failures: vec![ErrorReport::new(Operation::Connect, &e)],
            };
        }
        self.refresh().await
    }

    /// Run the three contract reads concurrently
    pub async fn refresh(&self) -> RefreshReport {
        let (name, owner, balance) = tokio::join!(
            self.fetch_bank_name(),
            self.fetch_owner(),
            self.fetch_balance()
        );

        let failures = [
            (Operation::FetchBankName, name.err()),
            (Operation::FetchOwner, owner.err()),
            (Operation::FetchBalance, balance.err()),
        ]
        .into_iter()
        .filter_map(|(operation, error)| error.map(|e| ErrorReport::new(operation, &e)))
        .collect::<Vec<_>>();

        if failures.is_empty() {
            log::info!("✅ Session synchronized");
        } else {
            log::warn!("⚠️  Session refresh: {} fetch(es) failed", failures.len());
        }

        RefreshReport {
            connected: self.store.read(|s| s.connection.is_connected()),
            failures,
        }
    }

    // ============================================================================
    // Wallet
    // ============================================================================

    /// Request account access; the first account becomes the caller
    pub async fn connect(&self) -> Result<Address, BankError> {
        let result = self.run_connect().await;
        self.finish(Operation::Connect, result)
    }

    async fn run_connect(&self) -> Result<Address, BankError> {
        let remote = self.remote()?;
        let _guard = InFlightGuard::acquire(&self.store, Operation::Connect)?;

        let previous = self.store.update(|s| {
            std::mem::replace(&mut s.connection, ConnectionState::Connecting)
        });

        let account = match remote.wallet.request_accounts().await {
            Ok(accounts) => accounts
                .first()
                .copied()
                .ok_or_else(|| BankError::remote("wallet returned no accounts")),
            Err(e) => Err(e),
        };

        match account {
            Ok(account) => {
                self.store
                    .update(|s| s.connection = ConnectionState::Connected { account });
                log::info!("🔑 Account connected: {:?}", account);
                Ok(account)
            }
            Err(e) => {
                self.store.update(|s| s.connection = previous);
                Err(e)
            }
        }
    }

    // ============================================================================
    // Contract reads
    // ============================================================================

    pub async fn fetch_bank_name(&self) -> Result<String, BankError> {
        let result: Result<String, BankError> = async {
            let (remote, caller) = self.connected()?;
            let raw = remote.ledger.bank_name(caller).await?;
            log::debug!("   bankName raw: 0x{}", hex::encode(raw));
            let name = decode_bank_name(&raw)?;
            self.store.update(|s| {
                s.bank_name = Some(name.clone());
                s.last_synced_at = Some(Utc::now());
            });
            Ok(name)
        }
        .await;
        self.finish(Operation::FetchBankName, result)
    }

    /// Read the owner, then re-read the wallet's active account so the
    /// owner flag reflects the wallet as it is now
    pub async fn fetch_owner(&self) -> Result<Address, BankError> {
        let result: Result<Address, BankError> = async {
            let (remote, caller) = self.connected()?;
            let owner = remote.ledger.bank_owner(caller).await?;
            self.store.update(|s| {
                s.owner = Some(owner);
                s.last_synced_at = Some(Utc::now());
            });

            let accounts = remote.wallet.request_accounts().await?;
            match accounts.first().copied() {
                Some(account) if account != caller => {
                    log::info!("🔄 Wallet switched account: {:?} -> {:?}", caller, account);
                    self.store.update(|s| {
                        s.connection = ConnectionState::Connected { account };
                        s.balance = None;
                    });
                    // recorded on its own; the owner read stands
                    let _ = self.fetch_balance().await;
                }
                Some(_) => {}
                None => log::warn!("⚠️  Wallet returned no accounts, keeping {:?}", caller),
            }

            Ok(owner)
        }
        .await;
        self.finish(Operation::FetchOwner, result)
    }

    pub async fn fetch_balance(&self) -> Result<U256, BankError> {
        let result: Result<U256, BankError> = async {
            let (remote, caller) = self.connected()?;
            let balance = remote.ledger.customer_balance(caller).await?;
            log::debug!("   Retrieved balance: {} wei", balance);
            let current = self.store.update(|s| {
                if s.caller() != Some(caller) {
                    return false;
                }
                s.balance = Some(Balance(balance));
                s.last_synced_at = Some(Utc::now());
                true
            });
            if !current {
                log::debug!("   Discarding balance of {:?}, caller changed", caller);
            }
            Ok(balance)
        }
        .await;
        self.finish(Operation::FetchBalance, result)
    }

    // ============================================================================
    // Contract writes
    // ============================================================================

    /// Rename the bank; the contract rejects callers other than the owner
    pub async fn set_bank_name(&self, name: &str) -> Result<TransactionOutcome, BankError> {
        let result: Result<TransactionOutcome, BankError> = async {
            let (remote, caller) = self.connected()?;
            let encoded = encode_bank_name(require_value(name)?)?;
            let _guard = InFlightGuard::acquire(&self.store, Operation::SetBankName)?;

            log::info!("🏷️  Setting bank name to '{}'", name);
            let tx = remote.ledger.set_bank_name(caller, encoded).await?;
            let confirmation = self.confirm(remote, tx).await?;
            log::info!("   ✅ Bank name changed, tx {:?}", confirmation.tx_hash);

            // a failed re-fetch is recorded on its own; the rename stands
            let _ = self.fetch_bank_name().await;
            Ok(TransactionOutcome::new(Operation::SetBankName, confirmation))
        }
        .await;
        self.finish(Operation::SetBankName, result)
    }

    /// Deposit `amount` (decimal ether) into the caller's account
    pub async fn deposit(&self, amount: &str) -> Result<TransactionOutcome, BankError> {
        let result: Result<TransactionOutcome, BankError> = async {
            let (remote, caller) = self.connected()?;
            let value = parse_amount(require_value(amount)?)?;
            let _guard = InFlightGuard::acquire(&self.store, Operation::Deposit)?;

            log::info!("💰 Depositing {} ({} wei)", amount.trim(), value);
            let tx = remote.ledger.deposit(caller, value).await?;
            let confirmation = self.confirm(remote, tx).await?;
            log::info!("   ✅ Deposit confirmed, tx {:?}", confirmation.tx_hash);

            let _ = self.fetch_balance().await;
            Ok(TransactionOutcome::new(Operation::Deposit, confirmation))
        }
        .await;
        self.finish(Operation::Deposit, result)
    }

    /// Withdraw `amount` (decimal ether) back to the caller's address
    pub async fn withdraw(&self, amount: &str) -> Result<TransactionOutcome, BankError> {
        let result: Result<TransactionOutcome, BankError> = async {
            let (remote, caller) = self.connected()?;
            let value = parse_amount(require_value(amount)?)?;
            let _guard = InFlightGuard::acquire(&self.store, Operation::Withdraw)?;

            log::info!("🏧 Withdrawing {} ({} wei) to {:?}", amount.trim(), value, caller);
            let tx = remote.ledger.withdraw(caller, caller, value).await?;
            let confirmation = self.confirm(remote, tx).await?;
            log::info!("   ✅ Withdrawal confirmed, tx {:?}", confirmation.tx_hash);

            let _ = self.fetch_balance().await;
            Ok(TransactionOutcome::new(Operation::Withdraw, confirmation))
        }
        .await;
        self.finish(Operation::Withdraw, result)
    }

    // ============================================================================
    // Form inputs
    // ============================================================================

    /// Local-only merge of one form field
    pub fn update_input(&self, field_name: &str, value: impl Into<String>) -> Result<(), BankError> {
        let result = FormField::from_str(field_name).map(|field| {
            let value = value.into();
            self.store.update(|s| s.inputs.set(field, value));
        });
        self.finish(Operation::UpdateInput, result)
    }

    /// Dispatch the operation behind `field` with its current input, and
    /// clear the input once the transaction is confirmed
    pub async fn submit(&self, field: FormField) -> Result<TransactionOutcome, BankError> {
        let value = self.store.read(|s| s.inputs.get(field).to_string());

        let outcome = match field {
            FormField::Deposit => self.deposit(&value).await?,
            FormField::Withdraw => self.withdraw(&value).await?,
            FormField::BankName => self.set_bank_name(&value).await?,
        };

        self.store.update(|s| {
            // keep anything typed while the transaction was pending
            if s.inputs.get(field) == value {
                s.inputs.set(field, String::new());
            }
        });
        Ok(outcome)
    }

    // ============================================================================
    // Helpers
    // ============================================================================

    fn remote(&self) -> Result<&Remote, BankError> {
        self.remote
            .as_ref()
            .ok_or_else(|| BankError::MissingProvider(self.install_prompt.clone()))
    }

    /// Remote reads and writes need a connected caller
    fn connected(&self) -> Result<(&Remote, Address), BankError> {
        let remote = self.remote()?;
        let caller = self
            .store
            .read(|s| s.caller())
            .ok_or(BankError::NotConnected)?;
        Ok((remote, caller))
    }

    async fn confirm(&self, remote: &Remote, tx: PendingTx) -> Result<Confirmation, BankError> {
        log::debug!("   Waiting for confirmation of {:?}", tx.hash);
        tokio::time::timeout(
            self.confirmation_timeout,
            remote.ledger.wait_for_confirmation(tx),
        )
        .await
        .map_err(|_| BankError::Timeout(format!("{:?}", tx.hash)))?
    }

    /// Log and record failures as the session's user-visible error
    fn finish<T>(&self, operation: Operation, result: Result<T, BankError>) -> Result<T, BankError> {
        if let Err(ref e) = result {
            log::error!("❌ {} failed: {}", operation, e);
            let report = ErrorReport::new(operation, e);
            self.store.update(|s| s.error = Some(report));
        }
        result
    }
}

/// Blank form values are never submitted
fn require_value(value: &str) -> Result<&str, BankError> {
    if value.trim().is_empty() {
        return Err(BankError::InvalidInput("value is empty".to_string()));
    }
    Ok(value)
}
