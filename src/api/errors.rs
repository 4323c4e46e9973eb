use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::domain::error::DomainError;
use crate::domain::repositories::StoreError;

/// One message per rejected request field, keyed by the wire field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// API error type with HTTP status code and structured body
#[derive(Debug)]
pub enum ApiError {
    Failure { status: StatusCode, message: String },
    /// Rendered as a plain field-to-message map with status 400.
    Validation(FieldErrors),
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Failure {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Creates a 400 response carrying per-field validation messages
    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Stamp for an error body, computed at construction time from the clock
/// alone - no shared formatter state.
fn error_date_time() -> String {
    Utc::now().format("%Y-%m-%d %H:%M").to_string()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(fields) => {
                (StatusCode::BAD_REQUEST, Json(fields)).into_response()
            }
            ApiError::Failure { status, message } => {
                let body = Json(json!({
                    "errorCode": status.as_u16(),
                    "message": message,
                    "dateTime": error_date_time(),
                }));

                (status, body).into_response()
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match &err {
            DomainError::TeamNotFound(_) | DomainError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::InsufficientBalance { .. } | DomainError::InvalidAge => {
                StatusCode::BAD_REQUEST
            }
            DomainError::ConcurrencyConflict => StatusCode::CONFLICT,
            DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self::Failure {
            status,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        DomainError::from(err).into()
    }
}
