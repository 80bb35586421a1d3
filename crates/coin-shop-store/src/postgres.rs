//! PostgreSQL storage implementation.
//!
//! This module provides the `PgStore` implementation of the `Store` trait.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};

use coin_shop_core::{
    InventoryItem, ProductName, ReceivedCoins, SentCoins, Transfer, User, Username,
};

use crate::error::{Result, StoreError};
use crate::{Store, StoreTx, TxMode};

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// Idle connections kept open.
    pub min_connections: u32,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    /// Connections are recycled after this long.
    pub max_lifetime: Duration,
    /// Server-side `statement_timeout` applied to every session.
    pub statement_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 100,
            min_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            max_lifetime: Duration::from_secs(3600),
            statement_timeout: Duration::from_secs(5),
        }
    }
}

/// PostgreSQL-backed storage implementation.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool to the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or the database is unreachable.
    pub async fn connect(url: &str, config: &PoolConfig) -> Result<Self> {
        let statement_timeout_ms = config.statement_timeout.as_millis().to_string();
        let options = PgConnectOptions::from_str(url)?
            .options([("statement_timeout", statement_timeout_ms.as_str())]);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .max_lifetime(config.max_lifetime)
            .connect_with(options)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "PostgreSQL pool connected"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode_username(raw: String) -> Result<Username> {
    Username::try_from(raw).map_err(|e| StoreError::Decode(format!("username: {e}")))
}

fn decode_product(raw: String) -> Result<ProductName> {
    ProductName::try_from(raw).map_err(|e| StoreError::Decode(format!("product name: {e}")))
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self, mode: TxMode) -> Result<Box<dyn StoreTx>> {
        let mut tx = self.pool.begin().await?;

        if mode == TxMode::Snapshot {
            sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
                .execute(&mut *tx)
                .await?;
        }

        Ok(Box::new(PgTx { tx }))
    }

    async fn get_user(&self, username: &Username) -> Result<Option<User>> {
        let row: Option<(String, String, i64)> = sqlx::query_as(
            "SELECT username, password_hash, balance FROM users WHERE username = $1",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(name, password_hash, balance)| {
            Ok(User::new(decode_username(name)?, password_hash, balance))
        })
        .transpose()
    }

    async fn insert_user(&self, user: &User) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, balance) VALUES ($1, $2, $3) \
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(user.balance)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// A PostgreSQL transaction. Rolls back on drop unless committed.
struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn balance(&mut self, username: &Username) -> Result<Option<i64>> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM users WHERE username = $1")
                .bind(username.as_str())
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(balance)
    }

    async fn lock_balance(&mut self, username: &Username) -> Result<Option<i64>> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM users WHERE username = $1 FOR UPDATE")
                .bind(username.as_str())
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(balance)
    }

    async fn set_balance(&mut self, username: &Username, balance: i64) -> Result<()> {
        let result = sqlx::query("UPDATE users SET balance = $2 WHERE username = $1")
            .bind(username.as_str())
            .bind(balance)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "user",
                id: username.to_string(),
            });
        }
        Ok(())
    }

    async fn product_price(&mut self, product: &ProductName) -> Result<Option<i64>> {
        let price: Option<i64> =
            sqlx::query_scalar("SELECT price FROM products WHERE product_name = $1")
                .bind(product.as_str())
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(price)
    }

    async fn insert_purchase(&mut self, username: &Username, product: &ProductName) -> Result<()> {
        sqlx::query("INSERT INTO purchases (username, product_name) VALUES ($1, $2)")
            .bind(username.as_str())
            .bind(product.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_transfer(&mut self, transfer: &Transfer) -> Result<()> {
        sqlx::query(
            "INSERT INTO transfers (sender_username, receiver_username, amount, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(transfer.sender.as_str())
        .bind(transfer.receiver.as_str())
        .bind(transfer.amount)
        .bind(transfer.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn inventory(&mut self, username: &Username) -> Result<Vec<InventoryItem>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT product_name, COUNT(*) FROM purchases WHERE username = $1 \
             GROUP BY product_name ORDER BY product_name",
        )
        .bind(username.as_str())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter()
            .map(|(product, quantity)| {
                Ok(InventoryItem {
                    product: decode_product(product)?,
                    quantity,
                })
            })
            .collect()
    }

    async fn sent_transfers(&mut self, username: &Username) -> Result<Vec<SentCoins>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT receiver_username, amount FROM transfers WHERE sender_username = $1 \
             ORDER BY id",
        )
        .bind(username.as_str())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(to_user, amount)| SentCoins { to_user, amount })
            .collect())
    }

    async fn received_transfers(&mut self, username: &Username) -> Result<Vec<ReceivedCoins>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT sender_username, amount FROM transfers WHERE receiver_username = $1 \
             ORDER BY id",
        )
        .bind(username.as_str())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(from_user, amount)| ReceivedCoins { from_user, amount })
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let PgTx { tx } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let PgTx { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
