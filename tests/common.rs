/// Common test utilities for bank session integration tests
///
/// Builds sessions over the in-memory wallet and contract so tests run
/// without a node.
use std::sync::Arc;
use std::time::Duration;

use bank_dapp::provider::{InMemoryLedger, StaticWallet};
use bank_dapp::{BankConfig, SessionController};
use ethers::types::{Address, U256};

pub const OWNER: &str = "0xd427b183935D6Be800cE79C9B9CD6190e17f0c00";
pub const CUSTOMER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

pub fn address(hex: &str) -> Address {
    hex.parse().expect("valid test address")
}

pub fn ether(amount: &str) -> U256 {
    ethers::utils::parse_ether(amount).expect("valid test amount")
}

pub fn test_config() -> BankConfig {
    BankConfig {
        confirmation_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

/// Session with handles on its wallet and contract
pub struct TestEnvironment {
    pub session: Arc<SessionController>,
    pub wallet: Arc<StaticWallet>,
    pub ledger: Arc<InMemoryLedger>,
}

impl TestEnvironment {
    /// Session whose wallet holds `caller`; the contract is owned by OWNER
    pub fn new(caller: &str) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let wallet = Arc::new(StaticWallet::new(vec![address(caller)]));
        let ledger = Arc::new(InMemoryLedger::new(address(OWNER)));
        let session = Arc::new(SessionController::new(
            wallet.clone(),
            ledger.clone(),
            &test_config(),
        ));

        Self {
            session,
            wallet,
            ledger,
        }
    }
}
