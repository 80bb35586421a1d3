//! Coin Shop Client SDK.
//!
//! This crate provides a typed client for the coin shop HTTP API and a
//! rate-driven load generator built on it.
//!
//! # Example
//!
//! ```no_run
//! use coin_shop_client::CoinShopClient;
//!
//! # async fn example() -> Result<(), coin_shop_client::ClientError> {
//! let mut client = CoinShopClient::new("http://localhost:8080")?;
//!
//! // Registers the account on first use
//! client.authenticate("alice", "password").await?;
//!
//! client.buy("cup").await?;
//! client.send_coin("bob", 10).await?;
//!
//! let info = client.info().await?;
//! println!("Balance: {} coins, {} cups", info.coins, info.quantity_of("cup"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
pub mod load;
mod types;

pub use client::{ClientOptions, CoinShopClient};
pub use error::ClientError;
pub use load::{LoadConfig, LoadReport, LoadTarget};
pub use types::*;
