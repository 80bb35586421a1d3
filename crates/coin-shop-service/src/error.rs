//! API error types and responses.
//!
//! Every error is rendered as `{"errors": "<message>"}`. Storage and internal
//! details are logged, never returned.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use coin_shop_core::ShopError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed or rejected credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Bad request - invalid input.
    #[error("{0}")]
    BadRequest(String),

    /// Unknown product, recipient or user.
    #[error("{0}")]
    NotFound(String),

    /// Balance does not cover the debit.
    #[error("insufficient balance")]
    InsufficientBalance {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description.
    pub errors: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::InsufficientBalance { balance, required } => {
                tracing::debug!(balance, required, "Insufficient balance");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { errors: message })).into_response()
    }
}

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        match err {
            ShopError::InvalidAmount(_)
            | ShopError::InvalidUsername(_)
            | ShopError::InvalidProduct(_)
            | ShopError::EmptyPassword
            | ShopError::SelfTransfer => Self::BadRequest(err.to_string()),
            ShopError::InvalidCredentials => Self::Unauthorized,
            ShopError::ProductNotFound { .. } => Self::NotFound("product not found".into()),
            ShopError::UnknownRecipient { .. } => Self::NotFound("recipient not found".into()),
            ShopError::UserNotFound { .. } => Self::NotFound("user not found".into()),
            ShopError::InsufficientBalance { balance, required } => {
                Self::InsufficientBalance { balance, required }
            }
            ShopError::Storage(msg) | ShopError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        Self::BadRequest("invalid request body".into())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request path");
        Self::BadRequest("invalid request path".into())
    }
}
