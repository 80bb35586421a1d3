//! Error types for the coin shop.

use crate::ids::NameError;

/// Result type for shop operations.
pub type Result<T> = std::result::Result<T, ShopError>;

/// Errors that can occur in shop operations.
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    /// Transfer amount is zero or negative.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// Username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(NameError),

    /// Product name failed validation.
    #[error("invalid product name: {0}")]
    InvalidProduct(NameError),

    /// Password is empty.
    #[error("password is empty")]
    EmptyPassword,

    /// Sender and receiver are the same user.
    #[error("cannot send coins to yourself")]
    SelfTransfer,

    /// Username/password pair did not verify.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No product with this name.
    #[error("product not found: {product}")]
    ProductNotFound {
        /// The requested product.
        product: String,
    },

    /// Transfer receiver does not exist.
    #[error("unknown recipient: {username}")]
    UnknownRecipient {
        /// The requested receiver.
        username: String,
    },

    /// User row is missing.
    #[error("user not found: {username}")]
    UserNotFound {
        /// The missing user.
        username: String,
    },

    /// Balance does not cover the debit.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Password hashing or token signing failed.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`ShopError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// Bad credentials.
    Auth,
    /// Unknown product, recipient or user.
    NotFound,
    /// Insufficient balance.
    Conflict,
    /// Database unavailable or driver failure.
    Storage,
    /// Anything else the caller cannot fix.
    Internal,
}

impl ShopError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_)
            | Self::InvalidUsername(_)
            | Self::InvalidProduct(_)
            | Self::EmptyPassword
            | Self::SelfTransfer => ErrorKind::Validation,
            Self::InvalidCredentials => ErrorKind::Auth,
            Self::ProductNotFound { .. }
            | Self::UnknownRecipient { .. }
            | Self::UserNotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientBalance { .. } => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether retrying the same call could succeed.
    ///
    /// Only storage failures qualify; every other error is deterministic for
    /// the same input.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::Storage)
    }
}
