//! Authentication extractor.
//!
//! Protected handlers take an [`AuthUser`], which validates the
//! `Authorization: Bearer <token>` header against the service's signing key.
//! No database lookup is made.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use coin_shop_core::Username;

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated user extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The username from the token's `sub` claim.
    pub username: Username,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let username = state.signer.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            ApiError::Unauthorized
        })?;

        Ok(AuthUser { username })
    }
}
