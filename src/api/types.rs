use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::session::{RefreshReport, SessionSnapshot, TransactionOutcome};

#[derive(Debug, Deserialize)]
pub struct UpdateInputRequest {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SetBankNameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AmountRequest {
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub report: RefreshReport,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub outcome: TransactionOutcome,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct BankNameResponse {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct OwnerResponse {
    pub owner: Address,
    pub is_owner: bool,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: String,
    pub balance_wei: String,
}
