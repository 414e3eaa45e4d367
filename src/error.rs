use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Blockchain RPC error: {0}")]
    BlockchainRPC(String),

    #[error("Minter wallet is not configured")]
    SignerNotConfigured,

    #[error("Wrong network: expected chain {expected}, RPC reports {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Insufficient funds for gas")]
    InsufficientFunds,

    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Database(ref e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                e.to_string(),
            ),
            AppError::Redis(ref e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CACHE_ERROR",
                e.to_string(),
            ),
            AppError::BlockchainRPC(ref msg) => (
                StatusCode::BAD_GATEWAY,
                "BLOCKCHAIN_RPC_ERROR",
                msg.clone(),
            ),
            AppError::SignerNotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SIGNER_NOT_CONFIGURED",
                "NFT minting is not enabled on this deployment".to_string(),
            ),
            AppError::WrongNetwork { expected, actual } => (
                StatusCode::BAD_GATEWAY,
                "WRONG_NETWORK",
                format!("RPC is on chain {actual}, expected {expected}"),
            ),
            AppError::InsufficientFunds => (
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_FUNDS",
                "Minter wallet has insufficient funds for gas".to_string(),
            ),
            AppError::TransactionRejected(ref msg) => (
                StatusCode::BAD_REQUEST,
                "TRANSACTION_REJECTED",
                msg.clone(),
            ),
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                self.to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
