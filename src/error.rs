use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Failures of the pure leave layer: record validation, quota validation and
/// date-range expansion. The computation fails as a whole on the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaveError {
    #[error("invalid attendance record {record_id}: {reason}")]
    Validation { record_id: u64, reason: String },

    #[error("invalid leave balance config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid date range: {0}")]
    InvalidRange(String),
}

impl LeaveError {
    pub fn validation(record_id: u64, reason: impl Into<String>) -> Self {
        LeaveError::Validation {
            record_id,
            reason: reason.into(),
        }
    }

    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        LeaveError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("in-memory store lock poisoned")]
    Poisoned,
}

/// Everything a handler can fail with, mapped onto HTTP in `ResponseError`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Leave(#[from] LeaveError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Leave(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            ApiError::Store(e) => {
                tracing::error!(error = %e, "Store failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(json!({
            "error": message,
            "status": status.as_u16(),
        }))
    }
}
