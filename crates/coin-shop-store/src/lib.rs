//! Storage layer for the coin shop.
//!
//! This crate provides persistent storage for users, products, purchases and
//! transfers.
//!
//! # Architecture
//!
//! Callers reach the data through two traits:
//!
//! - [`Store`]: pool-level operations (credential lookup and insert-if-absent,
//!   health ping) and the entry point for transactions.
//! - [`StoreTx`]: everything that reads or mutates balances. A `StoreTx` is a
//!   single database transaction; dropping it without [`StoreTx::commit`]
//!   rolls back every change made through it.
//!
//! Two backends implement them:
//!
//! - [`PgStore`]: PostgreSQL via `sqlx`, with row locks
//!   (`SELECT ... FOR UPDATE`) for [`StoreTx::lock_balance`].
//! - [`MemoryStore`]: an in-process fake whose transactions are serialized
//!   behind one mutex and applied on commit.
//!
//! # Example
//!
//! ```no_run
//! use coin_shop_store::{MemoryStore, Store, TxMode};
//!
//! # async fn example() -> coin_shop_store::Result<()> {
//! let store = MemoryStore::with_default_catalog();
//!
//! let mut tx = store.begin(TxMode::ReadWrite).await?;
//! let _price = tx.product_price(&"cup".parse().unwrap()).await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod postgres;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::{PgStore, PoolConfig};

use async_trait::async_trait;
use coin_shop_core::{
    InventoryItem, ProductName, ReceivedCoins, SentCoins, Transfer, User, Username,
};

/// Isolation requested for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Read-write transaction used for balance mutations.
    ReadWrite,
    /// Read-only `REPEATABLE READ` snapshot used for aggregated reads.
    Snapshot,
}

/// The storage trait for pool-level operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (PostgreSQL, in-memory for testing).
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired in time.
    async fn begin(&self, mode: TxMode) -> Result<Box<dyn StoreTx>>;

    /// Get a user (credentials and balance) by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_user(&self, username: &Username) -> Result<Option<User>>;

    /// Insert a user unless the username is taken.
    ///
    /// Returns `false` when a row with this username already existed; the
    /// existing row is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn insert_user(&self, user: &User) -> Result<bool>;

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached.
    async fn ping(&self) -> Result<()>;
}

/// A single storage transaction.
#[async_trait]
pub trait StoreTx: Send {
    // =========================================================================
    // Balances
    // =========================================================================

    /// Read a balance without locking.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn balance(&mut self, username: &Username) -> Result<Option<i64>>;

    /// Read a balance and lock the row until the transaction ends.
    ///
    /// Returns `None` (and locks nothing) when the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn lock_balance(&mut self, username: &Username) -> Result<Option<i64>>;

    /// Overwrite a balance.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the user doesn't exist.
    /// - `StoreError::Database` if the balance would be negative.
    async fn set_balance(&mut self, username: &Username, balance: i64) -> Result<()>;

    // =========================================================================
    // Products and records
    // =========================================================================

    /// Look up a product price.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn product_price(&mut self, product: &ProductName) -> Result<Option<i64>>;

    /// Append a purchase record.
    ///
    /// # Errors
    ///
    /// Returns an error if the user or product doesn't exist.
    async fn insert_purchase(&mut self, username: &Username, product: &ProductName) -> Result<()>;

    /// Append a transfer record.
    ///
    /// # Errors
    ///
    /// Returns an error if either user doesn't exist.
    async fn insert_transfer(&mut self, transfer: &Transfer) -> Result<()>;

    // =========================================================================
    // History
    // =========================================================================

    /// Purchase counts per product, ordered by product name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn inventory(&mut self, username: &Username) -> Result<Vec<InventoryItem>>;

    /// Transfers sent by the user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn sent_transfers(&mut self, username: &Username) -> Result<Vec<SentCoins>>;

    /// Transfers received by the user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn received_transfers(&mut self, username: &Username) -> Result<Vec<ReceivedCoins>>;

    // =========================================================================
    // Completion
    // =========================================================================

    /// Commit every change made in this transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; nothing is applied in that case.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every change made in this transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback could not be sent.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
