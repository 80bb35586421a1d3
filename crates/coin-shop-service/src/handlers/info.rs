//! Account view handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use coin_shop_core::InfoView;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Get the caller's balance, inventory and coin history.
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<InfoView>, ApiError> {
    let info = state.shop.get_info(&auth.username).await?;
    Ok(Json(info))
}
