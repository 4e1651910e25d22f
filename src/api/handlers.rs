use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use super::types::*;
use crate::codec::format_amount;
use crate::error::BankError;
use crate::session::{FormField, SessionController, SessionSnapshot};

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_session_handler(
    State(session): State<Arc<SessionController>>,
) -> Json<SessionSnapshot> {
    Json(session.snapshot())
}

pub async fn connect_handler(
    State(session): State<Arc<SessionController>>,
) -> Result<Json<SessionSnapshot>, BankError> {
    session.connect().await?;
    Ok(Json(session.snapshot()))
}

pub async fn mount_handler(State(session): State<Arc<SessionController>>) -> Json<RefreshResponse> {
    let report = session.mount().await;
    Json(RefreshResponse {
        report,
        session: session.snapshot(),
    })
}

pub async fn refresh_handler(
    State(session): State<Arc<SessionController>>,
) -> Json<RefreshResponse> {
    let report = session.refresh().await;
    Json(RefreshResponse {
        report,
        session: session.snapshot(),
    })
}

pub async fn update_input_handler(
    State(session): State<Arc<SessionController>>,
    Json(req): Json<UpdateInputRequest>,
) -> Result<Json<SessionSnapshot>, BankError> {
    session.update_input(&req.field, req.value)?;
    Ok(Json(session.snapshot()))
}

pub async fn submit_input_handler(
    State(session): State<Arc<SessionController>>,
    Path(field): Path<String>,
) -> Result<Json<TransactionResponse>, BankError> {
    let field = FormField::from_str(&field)?;
    log::info!("Form submission: {:?}", field);
    let outcome = session.submit(field).await?;
    Ok(Json(TransactionResponse {
        outcome,
        session: session.snapshot(),
    }))
}

pub async fn get_bank_name_handler(
    State(session): State<Arc<SessionController>>,
) -> Result<Json<BankNameResponse>, BankError> {
    let name = session.fetch_bank_name().await?;
    Ok(Json(BankNameResponse { name }))
}

pub async fn set_bank_name_handler(
    State(session): State<Arc<SessionController>>,
    Json(req): Json<SetBankNameRequest>,
) -> Result<Json<TransactionResponse>, BankError> {
    let outcome = session.set_bank_name(&req.name).await?;
    Ok(Json(TransactionResponse {
        outcome,
        session: session.snapshot(),
    }))
}

pub async fn get_owner_handler(
    State(session): State<Arc<SessionController>>,
) -> Result<Json<OwnerResponse>, BankError> {
    let owner = session.fetch_owner().await?;
    Ok(Json(OwnerResponse {
        owner,
        is_owner: session.is_owner(),
    }))
}

pub async fn get_balance_handler(
    State(session): State<Arc<SessionController>>,
) -> Result<Json<BalanceResponse>, BankError> {
    let balance = session.fetch_balance().await?;
    Ok(Json(BalanceResponse {
        balance: format_amount(balance),
        balance_wei: balance.to_string(),
    }))
}

pub async fn deposit_handler(
    State(session): State<Arc<SessionController>>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<TransactionResponse>, BankError> {
    let outcome = session.deposit(&req.amount).await?;
    Ok(Json(TransactionResponse {
        outcome,
        session: session.snapshot(),
    }))
}

pub async fn withdraw_handler(
    State(session): State<Arc<SessionController>>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<TransactionResponse>, BankError> {
    let outcome = session.withdraw(&req.amount).await?;
    Ok(Json(TransactionResponse {
        outcome,
        session: session.snapshot(),
    }))
}
