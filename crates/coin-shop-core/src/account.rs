//! User account types.

use serde::{Deserialize, Serialize};

use crate::Username;

/// Balance granted to an account created by its first authentication.
pub const DEFAULT_INITIAL_BALANCE: i64 = 0;

/// A user row: credentials plus the coin balance.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique username.
    pub username: Username,

    /// Argon2 password hash in PHC string format.
    pub password_hash: String,

    /// Current coin balance. Never negative.
    pub balance: i64,
}

impl User {
    /// Create a user record with the given hash and opening balance.
    #[must_use]
    pub fn new(username: Username, password_hash: String, balance: i64) -> Self {
        Self {
            username,
            password_hash,
            balance,
        }
    }
}

// Keeps the password hash out of logs.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish_non_exhaustive()
    }
}
