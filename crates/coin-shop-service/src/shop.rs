//! Purchase, transfer and account view operations.
//!
//! Each mutating operation runs in one storage transaction. Balance rows are
//! locked before they are read for a decision, and a transfer always locks
//! its two rows in lexicographic username order so that opposing transfers
//! cannot deadlock. Any early return drops the transaction, which rolls it
//! back.

use std::sync::Arc;

use coin_shop_core::{CoinHistory, InfoView, ProductName, Result, ShopError, Transfer, Username};
use coin_shop_store::{Store, StoreTx, TxMode};

/// The shop engine.
#[derive(Clone)]
pub struct Shop {
    store: Arc<dyn Store>,
}

impl Shop {
    /// Create an engine over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Buy one unit of `item` for `username`.
    ///
    /// # Errors
    ///
    /// - `ProductNotFound` if the catalogue has no such item
    /// - `InsufficientBalance` if the balance is below the price
    /// - `UserNotFound` if the buyer's row is missing
    /// - `Storage` on database failure
    pub async fn buy_item(&self, username: &Username, item: &ProductName) -> Result<()> {
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;

        let Some(price) = tx.product_price(item).await? else {
            return abort(
                tx,
                ShopError::ProductNotFound {
                    product: item.to_string(),
                },
            )
            .await;
        };

        let Some(balance) = tx.lock_balance(username).await? else {
            return abort(
                tx,
                ShopError::UserNotFound {
                    username: username.to_string(),
                },
            )
            .await;
        };

        if balance < price {
            return abort(
                tx,
                ShopError::InsufficientBalance {
                    balance,
                    required: price,
                },
            )
            .await;
        }

        tx.set_balance(username, balance - price).await?;
        tx.insert_purchase(username, item).await?;
        tx.commit().await?;

        tracing::info!(
            username = %username,
            item = %item,
            price,
            balance = balance - price,
            "Item purchased"
        );

        Ok(())
    }

    /// Move `amount` coins from `sender` to `receiver`.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not positive
    /// - `SelfTransfer` if sender and receiver are the same user
    /// - `InsufficientBalance` if the sender cannot cover `amount`
    /// - `UnknownRecipient` if the receiver does not exist
    /// - `UserNotFound` if the sender's row is missing
    /// - `Internal` if the receiver's balance would overflow
    /// - `Storage` on database failure
    pub async fn send_coin(
        &self,
        sender: &Username,
        receiver: &Username,
        amount: i64,
    ) -> Result<()> {
        if amount <= 0 {
            return Err(ShopError::InvalidAmount(amount));
        }
        if sender == receiver {
            return Err(ShopError::SelfTransfer);
        }

        let mut tx = self.store.begin(TxMode::ReadWrite).await?;
        let (sender_balance, receiver_balance) =
            lock_pair(tx.as_mut(), sender, receiver).await?;

        let Some(sender_balance) = sender_balance else {
            return abort(
                tx,
                ShopError::UserNotFound {
                    username: sender.to_string(),
                },
            )
            .await;
        };

        if sender_balance < amount {
            return abort(
                tx,
                ShopError::InsufficientBalance {
                    balance: sender_balance,
                    required: amount,
                },
            )
            .await;
        }

        let Some(receiver_balance) = receiver_balance else {
            return abort(
                tx,
                ShopError::UnknownRecipient {
                    username: receiver.to_string(),
                },
            )
            .await;
        };

        let Some(credited) = receiver_balance.checked_add(amount) else {
            return abort(
                tx,
                ShopError::Internal(format!("balance of {receiver} would overflow")),
            )
            .await;
        };

        tx.set_balance(sender, sender_balance - amount).await?;
        tx.set_balance(receiver, credited).await?;
        tx.insert_transfer(&Transfer::new(sender.clone(), receiver.clone(), amount))
            .await?;
        tx.commit().await?;

        tracing::info!(
            sender = %sender,
            receiver = %receiver,
            amount,
            "Coins transferred"
        );

        Ok(())
    }

    /// Balance, inventory and transfer history for `username`, read from one
    /// consistent snapshot.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user row is missing
    /// - `Storage` on database failure
    pub async fn get_info(&self, username: &Username) -> Result<InfoView> {
        let mut tx = self.store.begin(TxMode::Snapshot).await?;

        let Some(coins) = tx.balance(username).await? else {
            return abort(
                tx,
                ShopError::UserNotFound {
                    username: username.to_string(),
                },
            )
            .await;
        };

        let inventory = tx.inventory(username).await?;
        let sent = tx.sent_transfers(username).await?;
        let received = tx.received_transfers(username).await?;
        tx.commit().await?;

        Ok(InfoView {
            coins,
            inventory,
            coin_history: CoinHistory { received, sent },
        })
    }
}

impl std::fmt::Debug for Shop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shop").finish_non_exhaustive()
    }
}

/// Lock both balances, lower username first. Returns `(a, b)` in argument
/// order regardless of lock order.
async fn lock_pair(
    tx: &mut dyn StoreTx,
    a: &Username,
    b: &Username,
) -> Result<(Option<i64>, Option<i64>)> {
    if a <= b {
        let first = tx.lock_balance(a).await?;
        let second = tx.lock_balance(b).await?;
        Ok((first, second))
    } else {
        let first = tx.lock_balance(b).await?;
        let second = tx.lock_balance(a).await?;
        Ok((second, first))
    }
}

/// Roll back and fail with `err`.
async fn abort<T>(tx: Box<dyn StoreTx>, err: ShopError) -> Result<T> {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "Rollback failed");
    }
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coin_shop_core::{InventoryItem, ReceivedCoins, SentCoins, User};
    use coin_shop_store::StoreError;
    use std::sync::Mutex;

    /// Records the order of `lock_balance` calls.
    #[derive(Default)]
    struct LockLog(Mutex<Vec<String>>);

    struct RecordingTx(Arc<LockLog>);

    #[async_trait]
    impl StoreTx for RecordingTx {
        async fn balance(&mut self, _: &Username) -> coin_shop_store::Result<Option<i64>> {
            Ok(Some(100))
        }
        async fn lock_balance(&mut self, u: &Username) -> coin_shop_store::Result<Option<i64>> {
            self.0 .0.lock().unwrap().push(u.to_string());
            Ok(Some(100))
        }
        async fn set_balance(&mut self, _: &Username, _: i64) -> coin_shop_store::Result<()> {
            Ok(())
        }
        async fn product_price(&mut self, _: &ProductName) -> coin_shop_store::Result<Option<i64>> {
            Ok(None)
        }
        async fn insert_purchase(
            &mut self,
            _: &Username,
            _: &ProductName,
        ) -> coin_shop_store::Result<()> {
            Ok(())
        }
        async fn insert_transfer(&mut self, _: &Transfer) -> coin_shop_store::Result<()> {
            Ok(())
        }
        async fn inventory(&mut self, _: &Username) -> coin_shop_store::Result<Vec<InventoryItem>> {
            Ok(Vec::new())
        }
        async fn sent_transfers(&mut self, _: &Username) -> coin_shop_store::Result<Vec<SentCoins>> {
            Ok(Vec::new())
        }
        async fn received_transfers(
            &mut self,
            _: &Username,
        ) -> coin_shop_store::Result<Vec<ReceivedCoins>> {
            Ok(Vec::new())
        }
        async fn commit(self: Box<Self>) -> coin_shop_store::Result<()> {
            Ok(())
        }
        async fn rollback(self: Box<Self>) -> coin_shop_store::Result<()> {
            Ok(())
        }
    }

    struct RecordingStore(Arc<LockLog>);

    #[async_trait]
    impl Store for RecordingStore {
        async fn begin(&self, _: TxMode) -> coin_shop_store::Result<Box<dyn StoreTx>> {
            Ok(Box::new(RecordingTx(Arc::clone(&self.0))))
        }
        async fn get_user(&self, _: &Username) -> coin_shop_store::Result<Option<User>> {
            Ok(None)
        }
        async fn insert_user(&self, _: &User) -> coin_shop_store::Result<bool> {
            Err(StoreError::Database("read only".into()))
        }
        async fn ping(&self) -> coin_shop_store::Result<()> {
            Ok(())
        }
    }

    fn name(s: &str) -> Username {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn transfers_lock_in_username_order() {
        let log = Arc::new(LockLog::default());
        let shop = Shop::new(Arc::new(RecordingStore(Arc::clone(&log))));

        shop.send_coin(&name("zed"), &name("amy"), 5).await.unwrap();
        shop.send_coin(&name("amy"), &name("zed"), 5).await.unwrap();

        let order = log.0.lock().unwrap().clone();
        assert_eq!(order, vec!["amy", "zed", "amy", "zed"]);
    }

    #[tokio::test]
    async fn amount_is_checked_before_storage() {
        let log = Arc::new(LockLog::default());
        let shop = Shop::new(Arc::new(RecordingStore(Arc::clone(&log))));

        for amount in [0, -1, i64::MIN] {
            let err = shop.send_coin(&name("amy"), &name("zed"), amount).await;
            assert!(matches!(err, Err(ShopError::InvalidAmount(a)) if a == amount));
        }
        assert!(log.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn self_transfer_is_rejected() {
        let shop = Shop::new(Arc::new(RecordingStore(Arc::default())));
        let err = shop.send_coin(&name("amy"), &name("amy"), 1).await;
        assert!(matches!(err, Err(ShopError::SelfTransfer)));
    }
}
