//! API handlers.

pub mod auth;
pub mod coins;
pub mod health;
pub mod info;
