//! Purchase and transfer records.
//!
//! Both tables are append-only. Balances change only in the same database
//! transaction that appends one of these records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProductName, Username};

/// A completed purchase of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Buyer.
    pub username: Username,
    /// Product bought.
    pub product: ProductName,
    /// When the purchase was recorded.
    pub purchased_at: DateTime<Utc>,
}

/// A coin transfer between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Debited user.
    pub sender: Username,
    /// Credited user.
    pub receiver: Username,
    /// Coins moved. Always positive.
    pub amount: i64,
    /// When the transfer was recorded.
    pub created_at: DateTime<Utc>,
}

impl Transfer {
    /// Create a transfer record stamped with the current time.
    #[must_use]
    pub fn new(sender: Username, receiver: Username, amount: i64) -> Self {
        Self {
            sender,
            receiver,
            amount,
            created_at: Utc::now(),
        }
    }
}
