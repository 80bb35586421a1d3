//! Login-or-register.
//!
//! The first successful authentication for an unknown username creates the
//! account. Later authentications must present the same password.

use std::sync::Arc;

use coin_shop_core::{Result, ShopError, User, Username};
use coin_shop_store::Store;

use crate::password::{PasswordError, PasswordHasher};
use crate::token::{TokenError, TokenSigner};

/// A successful authentication.
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// The authenticated user.
    pub username: Username,
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Whether this call created the account.
    pub created: bool,
}

/// Authenticates users, creating accounts on first use.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
    signer: Arc<TokenSigner>,
    initial_balance: i64,
}

impl AuthGate {
    /// Create a gate over `store`.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        hasher: PasswordHasher,
        signer: Arc<TokenSigner>,
        initial_balance: i64,
    ) -> Self {
        Self {
            store,
            hasher,
            signer,
            initial_balance,
        }
    }

    /// Verify or register `username` and issue a token.
    ///
    /// # Errors
    ///
    /// - `InvalidUsername` / `EmptyPassword` for malformed input
    /// - `InvalidCredentials` if the user exists with another password
    /// - `Storage` if the store is unavailable
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Authenticated> {
        let username: Username = username.parse().map_err(ShopError::InvalidUsername)?;
        if password.is_empty() {
            return Err(ShopError::EmptyPassword);
        }

        let created = match self.store.get_user(&username).await? {
            Some(user) => {
                self.check_password(&user, password).await?;
                false
            }
            None => self.register(&username, password).await?,
        };

        let token = self.signer.issue(&username).map_err(token_error)?;

        Ok(Authenticated {
            username,
            token,
            created,
        })
    }

    /// Insert a new user. Returns `false` if another request registered the
    /// same name first and the password matched that registration.
    async fn register(&self, username: &Username, password: &str) -> Result<bool> {
        let hash = self
            .hasher
            .hash(password.to_owned())
            .await
            .map_err(password_error)?;
        let user = User::new(username.clone(), hash, self.initial_balance);

        if self.store.insert_user(&user).await? {
            tracing::info!(
                username = %username,
                balance = self.initial_balance,
                "Registered new user"
            );
            return Ok(true);
        }

        // Lost a concurrent registration race.
        let existing = self
            .store
            .get_user(username)
            .await?
            .ok_or_else(|| ShopError::Storage(format!("user {username} vanished after insert")))?;
        self.check_password(&existing, password).await?;
        Ok(false)
    }

    async fn check_password(&self, user: &User, password: &str) -> Result<()> {
        let matches = self
            .hasher
            .verify(password.to_owned(), user.password_hash.clone())
            .await
            .map_err(password_error)?;

        if matches {
            Ok(())
        } else {
            tracing::debug!(username = %user.username, "Password mismatch");
            Err(ShopError::InvalidCredentials)
        }
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("initial_balance", &self.initial_balance)
            .finish_non_exhaustive()
    }
}

fn password_error(err: PasswordError) -> ShopError {
    ShopError::Internal(err.to_string())
}

fn token_error(err: TokenError) -> ShopError {
    ShopError::Internal(err.to_string())
}
