// In-memory wallet and Bank contract
//
// Mirrors the deployed contract's rules closely enough to drive the session
// without a node: owner-only rename, balance-checked withdraw, state applied
// only when a transaction is confirmed.

use std::collections::HashMap;

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use tokio::sync::{watch, Mutex};

use super::{BankLedger, Confirmation, PendingTx, WalletProvider};
use crate::error::BankError;

/// Wallet that always answers with a fixed account list
pub struct StaticWallet {
    accounts: Mutex<Vec<Address>>,
    reject: bool,
}

impl StaticWallet {
    pub fn new(accounts: Vec<Address>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            reject: false,
        }
    }

    /// Wallet whose user declines every account request
    pub fn rejecting() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    /// Simulate the user switching accounts in the wallet
    pub async fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().await = accounts;
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, BankError> {
        if self.reject {
            return Err(BankError::remote("User rejected the request."));
        }
        Ok(self.accounts.lock().await.clone())
    }
}

#[derive(Debug, Clone)]
enum Effect {
    Rename([u8; 32]),
    Credit { account: Address, amount: U256 },
    Debit { account: Address, amount: U256 },
}

#[derive(Debug, Default)]
struct LedgerState {
    name: [u8; 32],
    owner: Address,
    balances: HashMap<Address, U256>,
    pending: HashMap<TxHash, Effect>,
    submissions: u64,
    block_number: u64,
    reads_failing: bool,
}

impl LedgerState {
    fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn submit(&mut self, effect: Effect) -> PendingTx {
        self.submissions += 1;
        let hash = TxHash::from_low_u64_be(self.submissions);
        self.pending.insert(hash, effect);
        PendingTx { hash }
    }
}

pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    paused: watch::Sender<bool>,
}

impl InMemoryLedger {
    pub fn new(owner: Address) -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            state: Mutex::new(LedgerState {
                owner,
                ..Default::default()
            }),
            paused,
        }
    }

    /// Seed an account balance
    pub async fn credit(&self, account: Address, amount: U256) {
        let mut state = self.state.lock().await;
        let balance = state.balance_of(&account);
        state.balances.insert(account, balance + amount);
    }

    pub async fn balance_of(&self, account: Address) -> U256 {
        self.state.lock().await.balance_of(&account)
    }

    /// Number of transactions submitted so far
    pub async fn submissions(&self) -> u64 {
        self.state.lock().await.submissions
    }

    /// Hold every confirmation until `resume_confirmations`
    pub fn pause_confirmations(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume_confirmations(&self) {
        self.paused.send_replace(false);
    }

    /// Make every read fail, as an unreachable node would
    pub async fn set_reads_failing(&self, failing: bool) {
        self.state.lock().await.reads_failing = failing;
    }

    async fn readable(&self) -> Result<tokio::sync::MutexGuard<'_, LedgerState>, BankError> {
        let state = self.state.lock().await;
        if state.reads_failing {
            return Err(BankError::remote("node unreachable"));
        }
        Ok(state)
    }
}

#[async_trait]
impl BankLedger for InMemoryLedger {
    async fn bank_name(&self, _caller: Address) -> Result<[u8; 32], BankError> {
        Ok(self.readable().await?.name)
    }

    async fn bank_owner(&self, _caller: Address) -> Result<Address, BankError> {
        Ok(self.readable().await?.owner)
    }

    async fn customer_balance(&self, caller: Address) -> Result<U256, BankError> {
        Ok(self.readable().await?.balance_of(&caller))
    }

    async fn set_bank_name(&self, caller: Address, name: [u8; 32]) -> Result<PendingTx, BankError> {
        let mut state = self.state.lock().await;
        if caller != state.owner {
            return Err(BankError::remote(
                "execution reverted: caller is not the bank owner",
            ));
        }
        Ok(state.submit(Effect::Rename(name)))
    }

    async fn deposit(&self, caller: Address, value: U256) -> Result<PendingTx, BankError> {
        let mut state = self.state.lock().await;
        Ok(state.submit(Effect::Credit {
            account: caller,
            amount: value,
        }))
    }

    async fn withdraw(
        &self,
        caller: Address,
        _recipient: Address,
        amount: U256,
    ) -> Result<PendingTx, BankError> {
        let mut state = self.state.lock().await;
        if amount > state.balance_of(&caller) {
            return Err(BankError::remote(
                "execution reverted: insufficient balance",
            ));
        }
        Ok(state.submit(Effect::Debit {
            account: caller,
            amount,
        }))
    }

    async fn wait_for_confirmation(&self, tx: PendingTx) -> Result<Confirmation, BankError> {
        let mut paused = self.paused.subscribe();
        paused
            .wait_for(|paused| !*paused)
            .await
            .map_err(|e| BankError::remote(format!("confirmation channel closed: {}", e)))?;

        let mut state = self.state.lock().await;
        let effect = state
            .pending
            .remove(&tx.hash)
            .ok_or_else(|| BankError::remote(format!("transaction {:?} was dropped", tx.hash)))?;

        match effect {
            Effect::Rename(name) => state.name = name,
            Effect::Credit { account, amount } => {
                let balance = state.balance_of(&account);
                state.balances.insert(account, balance + amount);
            }
            Effect::Debit { account, amount } => {
                let balance = state.balance_of(&account);
                if amount > balance {
                    return Err(BankError::remote(format!(
                        "transaction {:?} reverted",
                        tx.hash
                    )));
                }
                state.balances.insert(account, balance - amount);
            }
        }

        state.block_number += 1;
        Ok(Confirmation {
            tx_hash: tx.hash,
            block_number: Some(state.block_number),
        })
    }
}
