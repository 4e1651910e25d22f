// Remote boundaries of a bank session
// - WalletProvider: account access through the user's wallet
// - BankLedger: the deployed Bank contract, reads and signed writes

pub mod mock;
pub mod rpc;

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use serde::Serialize;

use crate::error::BankError;

pub use mock::{InMemoryLedger, StaticWallet};
pub use rpc::{EthBankLedger, EthWallet, BANK_ABI};

/// Wallet side of the session (`eth_requestAccounts`)
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request account access; the first account is the active one
    async fn request_accounts(&self) -> Result<Vec<Address>, BankError>;
}

/// Handle for a submitted, not yet confirmed, transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTx {
    pub hash: TxHash,
}

/// Inclusion proof of a confirmed transaction
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

/// Contract side of the session
///
/// Reads take the caller explicitly because `getCustomerBalance` resolves
/// the account from the call's sender. Writes return as soon as the wallet
/// has submitted the transaction; callers must `wait_for_confirmation`
/// before treating the change as applied.
#[async_trait]
pub trait BankLedger: Send + Sync {
    async fn bank_name(&self, caller: Address) -> Result<[u8; 32], BankError>;

    async fn bank_owner(&self, caller: Address) -> Result<Address, BankError>;

    async fn customer_balance(&self, caller: Address) -> Result<U256, BankError>;

    async fn set_bank_name(&self, caller: Address, name: [u8; 32]) -> Result<PendingTx, BankError>;

    async fn deposit(&self, caller: Address, value: U256) -> Result<PendingTx, BankError>;

    async fn withdraw(
        &self,
        caller: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<PendingTx, BankError>;

    /// Wait until the transaction is included; a dropped or reverted
    /// transaction is an error
    async fn wait_for_confirmation(&self, tx: PendingTx) -> Result<Confirmation, BankError>;
}
