//! Session state container
//!
//! Everything the UI renders lives in `SessionState`. The controller is the
//! only writer; readers get a `SessionSnapshot`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::codec::format_amount;
use crate::error::{BankError, ErrorKind};

/// Session operations, as named in logs, errors and the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Connect,
    FetchBankName,
    SetBankName,
    FetchOwner,
    FetchBalance,
    Deposit,
    Withdraw,
    UpdateInput,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "connect",
            Self::FetchBankName => "fetch_bank_name",
            Self::SetBankName => "set_bank_name",
            Self::FetchOwner => "fetch_owner",
            Self::FetchBalance => "fetch_balance",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::UpdateInput => "update_input",
        };
        f.write_str(name)
    }
}

/// Wallet connection lifecycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected { account: Address },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    pub fn account(&self) -> Option<Address> {
        match self {
            Self::Connected { account } => Some(*account),
            _ => None,
        }
    }
}

/// Form fields the UI can edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormField {
    #[serde(rename = "deposit")]
    Deposit,
    #[serde(rename = "withdraw")]
    Withdraw,
    #[serde(rename = "bankName")]
    BankName,
}

impl FromStr for FormField {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(Self::Deposit),
            "withdraw" => Ok(Self::Withdraw),
            "bankName" => Ok(Self::BankName),
            other => Err(BankError::InvalidInput(format!("unknown form field '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInputs {
    pub deposit: String,
    pub withdraw: String,
    pub bank_name: String,
}

impl FormInputs {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Deposit => &self.deposit,
            FormField::Withdraw => &self.withdraw,
            FormField::BankName => &self.bank_name,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Deposit => self.deposit = value,
            FormField::Withdraw => self.withdraw = value,
            FormField::BankName => self.bank_name = value,
        }
    }
}

/// Last user-visible failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub operation: Operation,
    pub kind: ErrorKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl ErrorReport {
    pub fn new(operation: Operation, error: &BankError) -> Self {
        Self {
            operation,
            kind: error.kind(),
            message: error.to_string(),
            at: Utc::now(),
        }
    }
}

/// Caller balance in base units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance(pub U256);

impl Balance {
    pub fn display(&self) -> String {
        format_amount(self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub connection: ConnectionState,
    pub owner: Option<Address>,
    pub bank_name: Option<String>,
    pub balance: Option<Balance>,
    pub inputs: FormInputs,
    pub error: Option<ErrorReport>,
    pub in_flight: BTreeSet<Operation>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn caller(&self) -> Option<Address> {
        self.connection.account()
    }

    /// Owner flag, derived from the current caller and owner on every read
    pub fn is_owner(&self) -> bool {
        match (self.caller(), self.owner) {
            (Some(caller), Some(owner)) => addresses_match(&caller, &owner),
            _ => false,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connection: self.connection.clone(),
            caller_address: self.caller(),
            owner_address: self.owner,
            is_owner: self.is_owner(),
            bank_name: self.bank_name.clone(),
            balance: self.balance.map(|b| b.display()),
            balance_wei: self.balance.map(|b| b.0.to_string()),
            inputs: self.inputs.clone(),
            error: self.error.clone(),
            in_flight: self.in_flight.iter().copied().collect(),
            last_synced_at: self.last_synced_at,
        }
    }
}

/// Case-insensitive comparison of two account identifiers
///
/// Checksummed and lowercase hex spellings of one account compare equal.
pub fn addresses_match(a: &Address, b: &Address) -> bool {
    format!("{:?}", a).eq_ignore_ascii_case(&format!("{:?}", b))
}

/// Serializable view of the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub connection: ConnectionState,
    pub caller_address: Option<Address>,
    pub owner_address: Option<Address>,
    pub is_owner: bool,
    pub bank_name: Option<String>,
    pub balance: Option<String>,
    pub balance_wei: Option<String>,
    pub inputs: FormInputs,
    pub error: Option<ErrorReport>,
    pub in_flight: Vec<Operation>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    #[test]
    fn test_owner_flag_false_when_unset() {
        let mut state = SessionState::default();
        assert!(!state.is_owner());

        state.owner = Some(addr(7));
        assert!(!state.is_owner());

        state.owner = None;
        state.connection = ConnectionState::Connected { account: addr(7) };
        assert!(!state.is_owner());
    }

    #[test]
    fn test_owner_flag_follows_both_values() {
        let mut state = SessionState {
            connection: ConnectionState::Connected { account: addr(7) },
            owner: Some(addr(7)),
            ..Default::default()
        };
        assert!(state.is_owner());

        state.owner = Some(addr(8));
        assert!(!state.is_owner());

        state.connection = ConnectionState::Connected { account: addr(8) };
        assert!(state.is_owner());
    }

    #[test]
    fn test_addresses_match_ignores_case() {
        let checksummed: Address = "0xd427b183935D6Be800cE79C9B9CD6190e17f0c00".parse().unwrap();
        let lower: Address = "0xd427b183935d6be800ce79c9b9cd6190e17f0c00".parse().unwrap();
        assert!(addresses_match(&checksummed, &lower));
        assert!(!addresses_match(&checksummed, &addr(1)));
    }

    #[test]
    fn test_inputs_are_independent() {
        let mut inputs = FormInputs::default();
        inputs.set(FormField::Deposit, "2.0".to_string());
        inputs.set(FormField::Withdraw, "0.5".to_string());
        assert_eq!(inputs.get(FormField::Deposit), "2.0");
        assert_eq!(inputs.get(FormField::Withdraw), "0.5");
        assert_eq!(inputs.get(FormField::BankName), "");
    }

    #[test]
    fn test_form_field_names() {
        assert_eq!("bankName".parse::<FormField>().unwrap(), FormField::BankName);
        assert!("bank_name".parse::<FormField>().is_err());
    }

    #[test]
    fn test_snapshot_serializes_connection_tag() {
        let state = SessionState {
            connection: ConnectionState::Connecting,
            ..Default::default()
        };
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["connection"]["status"], "connecting");
        assert_eq!(json["is_owner"], false);
        assert!(json["balance"].is_null());
    }
}
