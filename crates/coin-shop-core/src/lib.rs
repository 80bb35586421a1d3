//! Core types for the coin shop.
//!
//! This crate provides the domain types shared by the storage layer, the
//! service and the client:
//!
//! - **Names**: `Username`, `ProductName`
//! - **Accounts**: `User`
//! - **Ledger records**: `Purchase`, `Transfer`
//! - **Read view**: `InfoView`, `InventoryItem`, `CoinHistory`
//! - **Errors**: `ShopError` and its `ErrorKind` classification
//!
//! Coins are whole numbers stored as `i64`; a balance is never negative.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod error;
pub mod ids;
pub mod info;
pub mod ledger;

pub use account::{User, DEFAULT_INITIAL_BALANCE};
pub use error::{ErrorKind, Result, ShopError};
pub use ids::{NameError, ProductName, Username, MAX_NAME_LEN};
pub use info::{CoinHistory, InfoView, InventoryItem, ReceivedCoins, SentCoins};
pub use ledger::{Purchase, Transfer};
