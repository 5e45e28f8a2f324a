//! Unified application error type.
//!
//! `AppError` is the only error that leaves the core: a closed code
//! enumeration plus a client-safe message, mapped onto an HTTP status by
//! `IntoResponse`. Storage failures are classified into one of these codes
//! before they get here (see `service::classify`); raw storage detail never
//! reaches a caller.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

/// Closed set of domain error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed or incomplete request body
    InvalidRequest,
    /// Order number fails the Luhn check or contains non-digits
    InvalidOrderNumber,
    /// Login already taken by another account
    LoginInUse,
    /// No account for the given login
    UserNotFound,
    /// Wrong password for an existing account
    InvalidCredentials,
    /// Missing, invalid or expired token; or token subject no longer resolves
    Unauthorized,
    /// Order number already uploaded by a different user
    OrderConflict,
    /// Withdrawal references an order number absent from the store
    OrderNotFound,
    /// Withdrawal amount exceeds the current balance
    InsufficientFunds,
    /// Unclassified internal failure; detail stays in the logs
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::InvalidOrderNumber => StatusCode::UNPROCESSABLE_ENTITY,
            Self::LoginInUse => StatusCode::CONFLICT,
            Self::UserNotFound => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::OrderConflict => StatusCode::CONFLICT,
            Self::OrderNotFound => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid request",
            Self::InvalidOrderNumber => "invalid order number",
            Self::LoginInUse => "login already exists",
            Self::UserNotFound => "user not found",
            Self::InvalidCredentials => "invalid login or password",
            Self::Unauthorized => "unauthorized",
            Self::OrderConflict => "order already uploaded by another user",
            Self::OrderNotFound => "order does not exist",
            Self::InsufficientFunds => "not enough balance",
            Self::Internal => "internal error",
        }
    }
}

#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ErrorCode> for AppError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        let body = serde_json::json!({
            "success": false,
            "error": { "code": self.code, "message": self.message },
        });
        (status, Json(body)).into_response()
    }
}
