use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::{Map, Value, json};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Insufficient token balance: have {balance}, need {required}")]
    InsufficientBalance { balance: String, required: String },

    #[error("Token approval required: allowance {allowance}, need {required}")]
    ApprovalRequired { allowance: String, required: String },

    #[error("Blockchain error: {0}")]
    ChainError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Allowance verification failed: allowance {allowance}, need {required}")]
    AllowanceVerificationFailed { allowance: String, required: String },

    #[error("Payment {transaction_hash} settled on-chain but order could not be recorded: {message}")]
    SettlementPersistence {
        transaction_hash: String,
        message: String,
    },

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// Status, public message and any extra fields merged into the error body.
    fn parts(&self) -> (StatusCode, String, Map<String, Value>) {
        let mut extra = Map::new();
        let (status, message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::WalletNotFound(msg) => {
                extra.insert("needsWalletCreation".into(), Value::Bool(true));
                (StatusCode::NOT_FOUND, msg.clone())
            }
            AppError::InsufficientBalance { balance, required } => {
                extra.insert("balance".into(), json!(balance));
                extra.insert("required".into(), json!(required));
                (
                    StatusCode::BAD_REQUEST,
                    "Insufficient UTICK balance".to_string(),
                )
            }
            AppError::ApprovalRequired {
                allowance,
                required,
            } => {
                extra.insert("needsApproval".into(), Value::Bool(true));
                extra.insert("allowance".into(), json!(allowance));
                extra.insert("requiredAllowance".into(), json!(required));
                (
                    StatusCode::BAD_REQUEST,
                    "Token approval required before payment".to_string(),
                )
            }
            AppError::ChainError(msg) => {
                extra.insert("details".into(), json!(msg));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Blockchain request failed".to_string(),
                )
            }
            AppError::TransactionFailed(msg) => {
                extra.insert("details".into(), json!(msg));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Transaction failed".to_string(),
                )
            }
            AppError::AllowanceVerificationFailed {
                allowance,
                required,
            } => {
                extra.insert("allowance".into(), json!(allowance));
                extra.insert("required".into(), json!(required));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Approval transaction confirmed but allowance is still insufficient"
                        .to_string(),
                )
            }
            AppError::SettlementPersistence {
                transaction_hash,
                message,
            } => {
                extra.insert("transactionHash".into(), json!(transaction_hash));
                extra.insert("details".into(), json!(message));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Payment succeeded but the order could not be recorded".to_string(),
                )
            }
            AppError::ExternalApiError(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };
        (status, message, extra)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.parts().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, message, extra) = self.parts();

        if status_code.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }

        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(false));
        body.insert("error".into(), Value::String(message));
        body.extend(extra);

        HttpResponse::build(status_code).json(Value::Object(body))
    }
}
