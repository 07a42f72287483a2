//! RPC error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coffer_exchange::ExchangeError;
use coffer_ledger::LedgerError;
use coffer_service::ServiceError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("server error: {0}")]
    Server(String),
}

pub type RpcResult<T> = Result<T, RpcError>;

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn ledger_status(err: &LedgerError) -> (StatusCode, &'static str) {
    match err {
        LedgerError::InsufficientBalance { .. } => (StatusCode::CONFLICT, "INSUFFICIENT_BALANCE"),
        LedgerError::RateChangeRejected { .. } => (StatusCode::CONFLICT, "RATE_CHANGE_REJECTED"),
        LedgerError::Overflow => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

fn service_status(err: &ServiceError) -> (StatusCode, &'static str) {
    match err {
        ServiceError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
        ServiceError::AllowanceExceeded { .. } => (StatusCode::CONFLICT, "ALLOWANCE_EXCEEDED"),
        ServiceError::Ledger(inner) => ledger_status(inner),
        ServiceError::Exchange(inner) => match inner {
            ExchangeError::ZeroDeposit => (StatusCode::BAD_REQUEST, "ZERO_DEPOSIT"),
            ExchangeError::InsufficientReserve { .. } => {
                (StatusCode::CONFLICT, "INSUFFICIENT_RESERVE")
            }
            ExchangeError::PayoutFailure { .. } => (StatusCode::CONFLICT, "PAYOUT_FAILURE"),
            ExchangeError::VaultOperation => (StatusCode::BAD_REQUEST, "VAULT_OPERATION"),
            ExchangeError::Ledger(inner) => ledger_status(inner),
            ExchangeError::Overflow => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        },
        ServiceError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
        ServiceError::Address(_) => (StatusCode::BAD_REQUEST, "INVALID_ADDRESS"),
        ServiceError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            RpcError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            RpcError::Service(inner) => service_status(inner),
            RpcError::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR"),
        };
        if status.is_server_error() {
            tracing::error!(code, error = %self, "rpc request failed");
        }
        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
