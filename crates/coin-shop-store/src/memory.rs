//! In-memory storage implementation.
//!
//! Every transaction holds one mutex for its whole lifetime and works on a
//! private copy of the state, which replaces the shared state on commit.
//! Transactions are therefore fully serialized, which is stricter than the
//! row locks PostgreSQL takes but observably equivalent for callers that
//! follow the same protocol.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use coin_shop_core::{
    InventoryItem, ProductName, Purchase, ReceivedCoins, SentCoins, Transfer, User, Username,
};

use crate::error::{Result, StoreError};
use crate::schema::DEFAULT_PRODUCTS;
use crate::{Store, StoreTx, TxMode};

#[derive(Debug, Clone, Default)]
struct State {
    users: BTreeMap<Username, User>,
    products: BTreeMap<ProductName, i64>,
    purchases: Vec<Purchase>,
    transfers: Vec<Transfer>,
}

impl State {
    fn require_user(&self, username: &Username) -> Result<()> {
        if self.users.contains_key(username) {
            Ok(())
        } else {
            Err(StoreError::Database(format!(
                "foreign key violation: user {username} does not exist"
            )))
        }
    }
}

/// In-memory storage for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Create an empty store with no products.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given `(name, price)` catalogue.
    #[must_use]
    pub fn with_products<I>(products: I) -> Self
    where
        I: IntoIterator<Item = (ProductName, i64)>,
    {
        let state = State {
            products: products.into_iter().collect(),
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Create a store seeded with the same catalogue as the SQL migration.
    #[must_use]
    pub fn with_default_catalog() -> Self {
        Self::with_products(DEFAULT_PRODUCTS.iter().filter_map(|(name, price)| {
            name.parse::<ProductName>().ok().map(|name| (name, *price))
        }))
    }

    /// Number of purchase records, across all users.
    pub async fn purchase_count(&self) -> usize {
        self.state.lock().await.purchases.len()
    }

    /// Number of transfer records, across all users.
    pub async fn transfer_count(&self) -> usize {
        self.state.lock().await.transfers.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self, _mode: TxMode) -> Result<Box<dyn StoreTx>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx { guard, staged }))
    }

    async fn get_user(&self, username: &Username) -> Result<Option<User>> {
        Ok(self.state.lock().await.users.get(username).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<bool> {
        if user.balance < 0 {
            return Err(StoreError::Database("balance check violated".into()));
        }

        let mut state = self.state.lock().await;
        if state.users.contains_key(&user.username) {
            return Ok(false);
        }
        state.users.insert(user.username.clone(), user.clone());
        Ok(true)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    staged: State,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn balance(&mut self, username: &Username) -> Result<Option<i64>> {
        Ok(self.staged.users.get(username).map(|u| u.balance))
    }

    async fn lock_balance(&mut self, username: &Username) -> Result<Option<i64>> {
        // The whole state is already locked by this transaction.
        self.balance(username).await
    }

    async fn set_balance(&mut self, username: &Username, balance: i64) -> Result<()> {
        if balance < 0 {
            return Err(StoreError::Database("balance check violated".into()));
        }

        let user = self
            .staged
            .users
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound {
                entity: "user",
                id: username.to_string(),
            })?;
        user.balance = balance;
        Ok(())
    }

    async fn product_price(&mut self, product: &ProductName) -> Result<Option<i64>> {
        Ok(self.staged.products.get(product).copied())
    }

    async fn insert_purchase(&mut self, username: &Username, product: &ProductName) -> Result<()> {
        self.staged.require_user(username)?;
        if !self.staged.products.contains_key(product) {
            return Err(StoreError::Database(format!(
                "foreign key violation: product {product} does not exist"
            )));
        }

        self.staged.purchases.push(Purchase {
            username: username.clone(),
            product: product.clone(),
            purchased_at: Utc::now(),
        });
        Ok(())
    }

    async fn insert_transfer(&mut self, transfer: &Transfer) -> Result<()> {
        self.staged.require_user(&transfer.sender)?;
        self.staged.require_user(&transfer.receiver)?;
        if transfer.amount <= 0 {
            return Err(StoreError::Database("amount check violated".into()));
        }

        self.staged.transfers.push(transfer.clone());
        Ok(())
    }

    async fn inventory(&mut self, username: &Username) -> Result<Vec<InventoryItem>> {
        let mut counts: BTreeMap<&ProductName, i64> = BTreeMap::new();
        for purchase in self.staged.purchases.iter().filter(|p| &p.username == username) {
            *counts.entry(&purchase.product).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(product, quantity)| InventoryItem {
                product: product.clone(),
                quantity,
            })
            .collect())
    }

    async fn sent_transfers(&mut self, username: &Username) -> Result<Vec<SentCoins>> {
        Ok(self
            .staged
            .transfers
            .iter()
            .filter(|t| &t.sender == username)
            .map(|t| SentCoins {
                to_user: t.receiver.to_string(),
                amount: t.amount,
            })
            .collect())
    }

    async fn received_transfers(&mut self, username: &Username) -> Result<Vec<ReceivedCoins>> {
        Ok(self
            .staged
            .transfers
            .iter()
            .filter(|t| &t.receiver == username)
            .map(|t| ReceivedCoins {
                from_user: t.sender.to_string(),
                amount: t.amount,
            })
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTx { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
