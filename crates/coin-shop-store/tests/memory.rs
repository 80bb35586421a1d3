//! In-memory store behaviour tests.

use coin_shop_core::{ProductName, Transfer, User, Username};
use coin_shop_store::{MemoryStore, Store, StoreError, StoreTx, TxMode};

fn name(s: &str) -> Username {
    s.parse().unwrap()
}

fn product(s: &str) -> ProductName {
    s.parse().unwrap()
}

async fn store_with_alice(balance: i64) -> MemoryStore {
    let store = MemoryStore::with_default_catalog();
    assert!(store
        .insert_user(&User::new(name("alice"), "hash".into(), balance))
        .await
        .unwrap());
    store
}

#[tokio::test]
async fn insert_user_is_insert_if_absent() {
    let store = store_with_alice(100).await;

    let inserted = store
        .insert_user(&User::new(name("alice"), "other".into(), 5))
        .await
        .unwrap();
    assert!(!inserted);

    let alice = store.get_user(&name("alice")).await.unwrap().unwrap();
    assert_eq!(alice.password_hash, "hash");
    assert_eq!(alice.balance, 100);
}

#[tokio::test]
async fn committed_changes_are_visible() {
    let store = store_with_alice(100).await;

    let mut tx = store.begin(TxMode::ReadWrite).await.unwrap();
    tx.set_balance(&name("alice"), 80).await.unwrap();
    tx.insert_purchase(&name("alice"), &product("cup")).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(store.get_user(&name("alice")).await.unwrap().unwrap().balance, 80);
    assert_eq!(store.purchase_count().await, 1);
}

#[tokio::test]
async fn dropped_transaction_rolls_back() {
    let store = store_with_alice(100).await;

    {
        let mut tx = store.begin(TxMode::ReadWrite).await.unwrap();
        tx.set_balance(&name("alice"), 0).await.unwrap();
        tx.insert_purchase(&name("alice"), &product("cup")).await.unwrap();
    }

    assert_eq!(store.get_user(&name("alice")).await.unwrap().unwrap().balance, 100);
    assert_eq!(store.purchase_count().await, 0);
}

#[tokio::test]
async fn explicit_rollback_discards_changes() {
    let store = store_with_alice(100).await;

    let mut tx = store.begin(TxMode::ReadWrite).await.unwrap();
    tx.set_balance(&name("alice"), 1).await.unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(store.get_user(&name("alice")).await.unwrap().unwrap().balance, 100);
}

#[tokio::test]
async fn negative_balance_is_rejected() {
    let store = store_with_alice(10).await;

    let mut tx = store.begin(TxMode::ReadWrite).await.unwrap();
    let err = tx.set_balance(&name("alice"), -1).await.unwrap_err();
    assert!(matches!(err, StoreError::Database(_)));
}

#[tokio::test]
async fn set_balance_of_missing_user_is_not_found() {
    let store = MemoryStore::new();

    let mut tx = store.begin(TxMode::ReadWrite).await.unwrap();
    let err = tx.set_balance(&name("ghost"), 1).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "user", .. }));
}

#[tokio::test]
async fn records_require_existing_rows() {
    let store = store_with_alice(10).await;

    let mut tx = store.begin(TxMode::ReadWrite).await.unwrap();
    assert!(tx
        .insert_purchase(&name("alice"), &product("yacht"))
        .await
        .is_err());
    assert!(tx
        .insert_transfer(&Transfer::new(name("alice"), name("ghost"), 1))
        .await
        .is_err());
}

#[tokio::test]
async fn inventory_groups_by_product_in_name_order() {
    let store = store_with_alice(1000).await;

    let mut tx = store.begin(TxMode::ReadWrite).await.unwrap();
    for item in ["pen", "cup", "pen"] {
        tx.insert_purchase(&name("alice"), &product(item)).await.unwrap();
    }
    tx.commit().await.unwrap();

    let mut tx = store.begin(TxMode::Snapshot).await.unwrap();
    let inventory = tx.inventory(&name("alice")).await.unwrap();
    let pairs: Vec<_> = inventory
        .iter()
        .map(|i| (i.product.as_str(), i.quantity))
        .collect();
    assert_eq!(pairs, vec![("cup", 1), ("pen", 2)]);
}

#[tokio::test]
async fn history_has_one_entry_per_transfer() {
    let store = store_with_alice(100).await;
    store
        .insert_user(&User::new(name("bob"), "hash".into(), 0))
        .await
        .unwrap();

    let mut tx = store.begin(TxMode::ReadWrite).await.unwrap();
    tx.insert_transfer(&Transfer::new(name("alice"), name("bob"), 5))
        .await
        .unwrap();
    tx.insert_transfer(&Transfer::new(name("alice"), name("bob"), 5))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin(TxMode::Snapshot).await.unwrap();
    let sent = tx.sent_transfers(&name("alice")).await.unwrap();
    let received = tx.received_transfers(&name("bob")).await.unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|s| s.to_user == "bob" && s.amount == 5));
    assert_eq!(received.len(), 2);
    assert!(tx.received_transfers(&name("alice")).await.unwrap().is_empty());
}

#[tokio::test]
async fn default_catalog_prices() {
    let store = MemoryStore::with_default_catalog();

    let mut tx = store.begin(TxMode::Snapshot).await.unwrap();
    assert_eq!(tx.product_price(&product("cup")).await.unwrap(), Some(20));
    assert_eq!(tx.product_price(&product("pink-hoody")).await.unwrap(), Some(500));
    assert_eq!(tx.product_price(&product("yacht")).await.unwrap(), None);
}
