//! Error types for bank session operations
//!
//! Every session operation returns a typed `BankError`. The controller
//! records the same error as the session's user-visible message, so the
//! front end sees every failure, not just a missing wallet.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::session::Operation;

#[derive(Error, Debug, Clone)]
pub enum BankError {
    /// No wallet provider configured or reachable
    #[error("{0}")]
    MissingProvider(String),

    /// Remote call rejected, reverted, dropped or failed in transport
    #[error("Remote call failed: {0}")]
    RemoteCall(String),

    /// Fixed-width string or decimal amount conversion failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Operation already in flight: {0}")]
    OperationInFlight(Operation),

    #[error("Timed out waiting for confirmation of {0}")]
    Timeout(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a `BankError`, serialized into API bodies and
/// the session's error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingProvider,
    RemoteCall,
    Encoding,
    NotConnected,
    InFlight,
    Timeout,
    InvalidInput,
    Config,
}

impl BankError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingProvider(_) => ErrorKind::MissingProvider,
            Self::RemoteCall(_) => ErrorKind::RemoteCall,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::NotConnected => ErrorKind::NotConnected,
            Self::OperationInFlight(_) => ErrorKind::InFlight,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Create a remote call error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteCall(msg.into())
    }

    /// Create an encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }
}

impl From<ethers::utils::ConversionError> for BankError {
    fn from(err: ethers::utils::ConversionError) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<ethers::providers::ProviderError> for BankError {
    fn from(err: ethers::providers::ProviderError) -> Self {
        Self::RemoteCall(err.to_string())
    }
}

impl IntoResponse for BankError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::MissingProvider => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::RemoteCall => StatusCode::BAD_GATEWAY,
            ErrorKind::Encoding | ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotConnected => StatusCode::UNAUTHORIZED,
            ErrorKind::InFlight => StatusCode::CONFLICT,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}
