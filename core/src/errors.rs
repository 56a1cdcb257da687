use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Faults raised by the adaptor core.
///
/// Caller-triggerable conditions (insufficient allowance, failed payments)
/// are not errors: they surface as `false` from the ERC-20 operations.
#[derive(Error, Debug)]
pub enum AdaptorError {
    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    #[error("Storage inconsistency: {0}")]
    StorageInconsistency(String),

    #[error("No contract runtime for handle {0}")]
    UnknownContract(i64),

    #[error("XDR error: {0}")]
    Xdr(#[from] soroban_sdk::xdr::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Internal server error")]
    Internal(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
        }
    }
}

impl From<AdaptorError> for AppError {
    fn from(err: AdaptorError) -> Self {
        match &err {
            AdaptorError::UnknownContract(_) => Self::NotFound(err.to_string()),
            AdaptorError::StorageInconsistency(detail) => {
                tracing::error!("Storage inconsistency: {}", detail);
                Self::Internal(err.to_string())
            }
            _ => Self::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
