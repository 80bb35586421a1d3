//! Request and response types for the coin shop client.

use serde::{Deserialize, Serialize};

pub use coin_shop_core::{CoinHistory, InfoView, InventoryItem, ReceivedCoins, SentCoins};

/// Request body for `POST /api/auth`.
#[derive(Clone, Serialize)]
pub struct AuthRequest {
    /// Username; created on first use.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Response body for `POST /api/auth`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token.
    pub token: String,
}

/// Request body for `POST /api/sendCoin`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    /// Receiver username.
    pub to_user: String,
    /// Coins to send.
    pub amount: i64,
}

/// Error body returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable description.
    pub errors: String,
}
