//! Error types for coin shop storage.

use coin_shop_core::ShopError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// SQLSTATE raised when `statement_timeout` cancels a query.
const QUERY_CANCELED: &str = "57014";

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Connection acquisition or a statement exceeded its time budget.
    #[error("database timeout")]
    Timeout,

    /// A stored value could not be decoded into a domain type.
    #[error("decode error: {0}")]
    Decode(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Key that was looked up.
        id: String,
    },

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut => Self::Timeout,
            sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
                Self::Timeout
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<StoreError> for ShopError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
