// Ethereum JSON-RPC implementation of the session boundaries
//
// The wallet provider is an EIP-1193 style JSON-RPC endpoint that holds the
// user's keys and signs `eth_sendTransaction` for its accounts. The contract
// proxy is built from the fixed deployment address and the Bank interface
// description below.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::abi::{parse_abi, Abi};
use ethers::contract::Contract;
use ethers::providers::{Http, PendingTransaction, Provider};
use ethers::types::{Address, U256, U64};

use super::{BankLedger, Confirmation, PendingTx, WalletProvider};
use crate::error::BankError;

/// Interface description of the deployed Bank contract
pub const BANK_ABI: &[&str] = &[
    "function bankName() view returns (bytes32)",
    "function setBankName(bytes32 _name)",
    "function bankOwner() view returns (address)",
    "function getCustomerBalance() view returns (uint256)",
    "function depositMoney() payable",
    "function withdrawMoney(address _to, uint256 _total)",
];

/// Build a JSON-RPC provider for the wallet endpoint
pub fn connect_provider(url: &str, poll_interval: Duration) -> Result<Arc<Provider<Http>>, BankError> {
    let url = reqwest::Url::parse(url)
        .map_err(|e| BankError::Config(format!("Invalid wallet provider URL '{}': {}", url, e)))?;
    let http = Http::new_with_client(url, reqwest::Client::new());
    Ok(Arc::new(Provider::new(http).interval(poll_interval)))
}

fn remote<E: Display>(context: &'static str) -> impl FnOnce(E) -> BankError {
    move |e| {
        log::error!("   ❌ {} failed: {}", context, e);
        BankError::remote(format!("{}: {}", context, e))
    }
}

pub struct EthWallet {
    provider: Arc<Provider<Http>>,
}

impl EthWallet {
    pub fn new(provider: Arc<Provider<Http>>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl WalletProvider for EthWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, BankError> {
        log::debug!("Requesting wallet accounts (eth_requestAccounts)");
        self.provider
            .request::<_, Vec<Address>>("eth_requestAccounts", ())
            .await
            .map_err(remote("eth_requestAccounts"))
    }
}

/// Read/write proxy to the Bank contract
pub struct EthBankLedger {
    contract: Contract<Provider<Http>>,
    provider: Arc<Provider<Http>>,
    poll_interval: Duration,
}

impl EthBankLedger {
    pub fn new(
        address: Address,
        provider: Arc<Provider<Http>>,
        poll_interval: Duration,
    ) -> Result<Self, BankError> {
        let abi: Abi = parse_abi(BANK_ABI)
            .map_err(|e| BankError::Config(format!("Invalid Bank interface: {}", e)))?;
        let contract = Contract::new(address, abi, provider.clone());

        log::info!("📜 Bank contract proxy at {:?}", address);

        Ok(Self {
            contract,
            provider,
            poll_interval,
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }
}

#[async_trait]
impl BankLedger for EthBankLedger {
    async fn bank_name(&self, caller: Address) -> Result<[u8; 32], BankError> {
        self.contract
            .method::<_, [u8; 32]>("bankName", ())
            .map_err(remote("bankName"))?
            .from(caller)
            .call()
            .await
            .map_err(remote("bankName"))
    }

    async fn bank_owner(&self, caller: Address) -> Result<Address, BankError> {
        self.contract
            .method::<_, Address>("bankOwner", ())
            .map_err(remote("bankOwner"))?
            .from(caller)
            .call()
            .await
            .map_err(remote("bankOwner"))
    }

    async fn customer_balance(&self, caller: Address) -> Result<U256, BankError> {
        self.contract
            .method::<_, U256>("getCustomerBalance", ())
            .map_err(remote("getCustomerBalance"))?
            .from(caller)
            .call()
            .await
            .map_err(remote("getCustomerBalance"))
    }

    async fn set_bank_name(&self, caller: Address, name: [u8; 32]) -> Result<PendingTx, BankError> {
        let call = self
            .contract
            .method::<_, ()>("setBankName", name)
            .map_err(remote("setBankName"))?
            .from(caller);
        let pending = call.send().await.map_err(remote("setBankName"))?;
        Ok(PendingTx { hash: *pending })
    }

    async fn deposit(&self, caller: Address, value: U256) -> Result<PendingTx, BankError> {
        let call = self
            .contract
            .method::<_, ()>("depositMoney", ())
            .map_err(remote("depositMoney"))?
            .from(caller)
            .value(value);
        let pending = call.send().await.map_err(remote("depositMoney"))?;
        Ok(PendingTx { hash: *pending })
    }

    async fn withdraw(
        &self,
        caller: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<PendingTx, BankError> {
        let call = self
            .contract
            .method::<_, ()>("withdrawMoney", (recipient, amount))
            .map_err(remote("withdrawMoney"))?
            .from(caller);
        let pending = call.send().await.map_err(remote("withdrawMoney"))?;
        Ok(PendingTx { hash: *pending })
    }

    async fn wait_for_confirmation(&self, tx: PendingTx) -> Result<Confirmation, BankError> {
        let receipt = PendingTransaction::new(tx.hash, self.provider.as_ref())
            .interval(self.poll_interval)
            .await?
            .ok_or_else(|| BankError::remote(format!("transaction {:?} was dropped", tx.hash)))?;

        if receipt.status != Some(U64::from(1)) {
            return Err(BankError::remote(format!(
                "transaction {:?} reverted",
                tx.hash
            )));
        }

        Ok(Confirmation {
            tx_hash: tx.hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
        })
    }
}
