//! Coin Shop HTTP API Service.
//!
//! This crate provides the HTTP API for the coin shop:
//!
//! - Login-or-register with bearer tokens
//! - Buying catalogue items with coins
//! - Sending coins between users
//! - Balance, inventory and transfer history
//!
//! # Authentication
//!
//! `POST /api/auth` returns an HS256 JWT. Every other `/api` route expects it
//! in an `Authorization: Bearer <token>` header.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result

pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod password;
pub mod routes;
pub mod shop;
pub mod state;
pub mod token;

pub use config::ServiceConfig;
pub use error::{ApiError, ErrorResponse};
pub use gate::{AuthGate, Authenticated};
pub use password::{HashCost, PasswordHasher};
pub use routes::create_router;
pub use shop::Shop;
pub use state::AppState;
pub use token::{Claims, TokenError, TokenSigner};
