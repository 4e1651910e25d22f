//! Bank session
//!
//! - `state`: the state container and its snapshot
//! - `store`: observable store and in-flight guards
//! - `controller`: the operations the UI triggers

pub mod controller;
pub mod state;
pub mod store;

pub use controller::{RefreshReport, SessionController, TransactionOutcome, MOCK_ACCOUNT};
pub use state::{
    addresses_match, ConnectionState, ErrorReport, FormField, FormInputs, Operation,
    SessionSnapshot, SessionState,
};
pub use store::{InFlightGuard, StateStore};
