//! Authentication handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /api/auth`.
#[derive(Deserialize)]
pub struct AuthRequest {
    /// Username; created on first use.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// Response body for `POST /api/auth`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token.
    pub token: String,
}

/// Authenticate, registering the user on first use.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(request) = payload?;

    let authenticated = state
        .gate
        .authenticate(&request.username, &request.password)
        .await?;

    Ok(Json(AuthResponse {
        token: authenticated.token,
    }))
}
