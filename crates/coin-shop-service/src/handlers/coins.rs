//! Coin transfer and purchase handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use coin_shop_core::{ProductName, ShopError, Username};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /api/sendCoin`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    /// Receiver username.
    pub to_user: String,
    /// Coins to send; must be positive.
    pub amount: i64,
}

/// Send coins to another user.
pub async fn send_coin(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<SendCoinRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;

    let receiver: Username = request
        .to_user
        .parse()
        .map_err(ShopError::InvalidUsername)?;

    state
        .shop
        .send_coin(&auth.username, &receiver, request.amount)
        .await?;

    Ok(StatusCode::OK)
}

/// Buy one unit of the item named in the path.
pub async fn buy_item(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    item: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(item) = item?;
    let item: ProductName = item.parse().map_err(ShopError::InvalidProduct)?;

    state.shop.buy_item(&auth.username, &item).await?;

    Ok(StatusCode::OK)
}
