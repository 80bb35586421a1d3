//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs whose `sub` claim is the username. Verification
//! fails closed: a token signed with another algorithm or key, an expired
//! token, or one without `sub`/`exp` never yields a username.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use coin_shop_core::Username;

/// Default token lifetime in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: u64 = 24;

/// JWT claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username).
    pub sub: String,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiration time, seconds since the epoch.
    pub exp: i64,
}

/// Token errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Sign(jsonwebtoken::errors::Error),

    /// Signature, algorithm or claims did not validate.
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    /// The `sub` claim is not a valid username.
    #[error("invalid token subject")]
    InvalidSubject,
}

/// Issues and verifies access tokens with a symmetric key.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    /// Create a signer from a shared secret and a token lifetime in hours.
    #[must_use]
    pub fn new(secret: &[u8], ttl_hours: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let ttl_hours = i64::try_from(ttl_hours).unwrap_or(i64::MAX);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::try_hours(ttl_hours).unwrap_or(Duration::MAX),
        }
    }

    /// Issue a token for `username`, valid from now.
    pub fn issue(&self, username: &Username) -> Result<String, TokenError> {
        self.issue_at(username, Utc::now())
    }

    /// Issue a token for `username` as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        username: &Username,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let claims = Claims {
            sub: username.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Verify a token and return the username it was issued to.
    pub fn verify(&self, token: &str) -> Result<Username, TokenError> {
        let data =
            decode::<Claims>(token, &self.decoding, &self.validation).map_err(TokenError::Invalid)?;

        data.claims
            .sub
            .parse()
            .map_err(|_| TokenError::InvalidSubject)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
