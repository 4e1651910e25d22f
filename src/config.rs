/// Session service configuration from environment variables
///
/// Controls the wallet provider endpoint, the contract deployment and the
/// confirmation policy. Defaults target a local development setup.
use std::env;
use std::str::FromStr;
use std::time::Duration;

use ethers::types::Address;

use crate::error::BankError;

/// Fixed deployment address of the Bank contract
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xd48988b1a6943aFDa005245512f6e5f60297A45C";

/// Message shown when no wallet provider is available
pub const INSTALL_PROMPT: &str = "Please install a MetaMask wallet to use our bank.";

/// Which implementation backs the wallet and contract boundaries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Ethereum JSON-RPC via the configured wallet provider
    Rpc,
    /// In-memory contract, for front-end development without a node
    Mock,
}

#[derive(Clone, Debug)]
pub struct BankConfig {
    /// JSON-RPC endpoint of the wallet provider (None = no provider present)
    pub provider_url: Option<String>,
    /// Deployed Bank contract
    pub contract_address: Address,
    pub backend: Backend,
    /// Upper bound on waiting for a transaction receipt
    pub confirmation_timeout: Duration,
    /// Receipt polling interval
    pub poll_interval: Duration,
    /// Address the HTTP API binds to
    pub bind_address: String,
    /// CORS origins; None allows any origin
    pub allowed_origins: Option<Vec<String>>,
    pub install_prompt: String,
}

impl BankConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `WALLET_PROVIDER_URL`: wallet JSON-RPC endpoint (unset = no wallet)
    /// - `BANK_CONTRACT_ADDRESS`: contract address (defaults to the fixed deployment)
    /// - `BANK_BACKEND`: "rpc" (default) or "mock"
    /// - `CONFIRMATION_TIMEOUT_SECS`: receipt wait bound (default 120)
    /// - `CONFIRMATION_POLL_MS`: receipt polling interval (default 2000)
    /// - `BIND_ADDRESS`: HTTP bind address (default 0.0.0.0:3000)
    /// - `ALLOWED_ORIGINS`: comma separated CORS origins
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Local node with unlocked accounts
    /// WALLET_PROVIDER_URL=http://localhost:8545 cargo run
    ///
    /// # No node at all
    /// BANK_BACKEND=mock cargo run
    /// ```
    pub fn from_env() -> Result<Self, BankError> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        let provider_url = env::var("WALLET_PROVIDER_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        match provider_url {
            Some(ref url) => log::info!("🔗 Wallet provider: {}", url),
            None => log::warn!("⚠️  WALLET_PROVIDER_URL not set, no wallet provider available"),
        }

        let contract_address = match env::var("BANK_CONTRACT_ADDRESS") {
            Ok(raw) => parse_address(&raw)?,
            Err(_) => defaults.contract_address,
        };
        log::info!("🏦 Bank contract: {:?}", contract_address);

        let backend = match env::var("BANK_BACKEND")
            .unwrap_or_else(|_| "rpc".to_string())
            .to_lowercase()
            .as_str()
        {
            "mock" => {
                log::info!("🔧 Using in-memory MOCK backend");
                Backend::Mock
            }
            "rpc" | "" => Backend::Rpc,
            other => {
                log::warn!("⚠️  Unknown backend '{}', defaulting to rpc", other);
                Backend::Rpc
            }
        };

        let confirmation_timeout = env::var("CONFIRMATION_TIMEOUT_SECS")
            .ok()
            .map(|raw| parse_number(&raw, "CONFIRMATION_TIMEOUT_SECS"))
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(defaults.confirmation_timeout);

        let poll_interval = env::var("CONFIRMATION_POLL_MS")
            .ok()
            .map(|raw| parse_number(&raw, "CONFIRMATION_POLL_MS"))
            .transpose()?
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        let bind_address = env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address);

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty());

        Ok(Self {
            provider_url,
            contract_address,
            backend,
            confirmation_timeout,
            poll_interval,
            bind_address,
            allowed_origins,
            install_prompt: defaults.install_prompt,
        })
    }
}

impl Default for BankConfig {
    /// Local development configuration, no wallet provider
    fn default() -> Self {
        Self {
            provider_url: None,
            contract_address: Address::from_str(DEFAULT_CONTRACT_ADDRESS)
                .unwrap_or_else(|_| Address::zero()),
            backend: Backend::Rpc,
            confirmation_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(2000),
            bind_address: "0.0.0.0:3000".to_string(),
            allowed_origins: None,
            install_prompt: INSTALL_PROMPT.to_string(),
        }
    }
}

fn parse_address(raw: &str) -> Result<Address, BankError> {
    Address::from_str(raw.trim())
        .map_err(|e| BankError::Config(format!("Invalid contract address '{}': {}", raw, e)))
}

fn parse_number(raw: &str, name: &str) -> Result<u64, BankError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| BankError::Config(format!("Invalid {} '{}': {}", name, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_fixed_deployment() {
        let config = BankConfig::default();
        assert_eq!(
            config.contract_address,
            Address::from_str(DEFAULT_CONTRACT_ADDRESS).unwrap()
        );
        assert!(config.provider_url.is_none());
        assert_eq!(config.backend, Backend::Rpc);
    }

    #[test]
    fn test_parse_address_accepts_any_case() {
        let lower = parse_address("0xd48988b1a6943afda005245512f6e5f60297a45c").unwrap();
        let mixed = parse_address(DEFAULT_CONTRACT_ADDRESS).unwrap();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        let err = parse_address("not-an-address").unwrap_err();
        assert!(matches!(err, BankError::Config(_)));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 30 ", "X").unwrap(), 30);
        assert!(parse_number("-1", "X").is_err());
    }
}
