//! Bank dApp: wallet session service for a deployed Bank contract
//!
//! This crate connects a user's wallet provider, mirrors the Bank
//! contract's state (name, owner, caller balance) into an observable session
//! and dispatches deposit, withdraw and rename transactions, waiting for each
//! confirmation before re-synchronizing.
//!
//! # Architecture
//!
//! - **Session Controller**: connection lifecycle, state mirroring, guarded submissions
//! - **Providers**: `WalletProvider` / `BankLedger` boundaries, over JSON-RPC or in memory
//! - **API**: JSON HTTP surface for the browser front end
//!
//! # Example
//!
//! ```ignore
//! use bank_dapp::{BankConfig, SessionController};
//!
//! let config = BankConfig::from_env()?;
//! let session = SessionController::from_config(&config)?;
//!
//! let report = session.mount().await;
//! if report.connected {
//!     session.deposit("1.5").await?;
//!     println!("balance: {:?}", session.snapshot().balance);
//! }
//! ```

// Public modules
pub mod api;
pub mod codec;
pub mod config;
pub mod error;
pub mod provider;
pub mod session;

// Re-exports for convenience
pub use config::{Backend, BankConfig};
pub use error::{BankError, ErrorKind};
pub use provider::{BankLedger, Confirmation, PendingTx, WalletProvider};
pub use session::{
    ConnectionState, FormField, Operation, RefreshReport, SessionController, SessionSnapshot,
    TransactionOutcome,
};

// Common result type
pub type Result<T> = std::result::Result<T, BankError>;
