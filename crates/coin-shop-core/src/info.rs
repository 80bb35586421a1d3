//! The aggregated account view returned by `GET /api/info`.

use serde::{Deserialize, Serialize};

use crate::ProductName;

/// Balance, inventory and coin history of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoView {
    /// Current balance.
    pub coins: i64,
    /// Purchased products with counts.
    pub inventory: Vec<InventoryItem>,
    /// Transfer history.
    pub coin_history: CoinHistory,
}

/// Number of purchases of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Product name.
    #[serde(rename = "type")]
    pub product: ProductName,
    /// Times the product was bought.
    pub quantity: i64,
}

/// Sent and received transfers, one entry per transfer row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    /// Transfers where the user was the receiver.
    pub received: Vec<ReceivedCoins>,
    /// Transfers where the user was the sender.
    pub sent: Vec<SentCoins>,
}

/// An incoming transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedCoins {
    /// Sender username.
    pub from_user: String,
    /// Coins received.
    pub amount: i64,
}

/// An outgoing transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentCoins {
    /// Receiver username.
    pub to_user: String,
    /// Coins sent.
    pub amount: i64,
}

impl InfoView {
    /// Quantity of `product` in the inventory, zero if never bought.
    #[must_use]
    pub fn quantity_of(&self, product: &str) -> i64 {
        self.inventory
            .iter()
            .find(|item| item.product.as_str() == product)
            .map_or(0, |item| item.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_wire_names() {
        let view = InfoView {
            coins: 90,
            inventory: vec![InventoryItem {
                product: "cup".parse().unwrap(),
                quantity: 1,
            }],
            coin_history: CoinHistory {
                received: vec![ReceivedCoins {
                    from_user: "bob".into(),
                    amount: 5,
                }],
                sent: vec![SentCoins {
                    to_user: "carol".into(),
                    amount: 3,
                }],
            },
        };

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(
            value,
            json!({
                "coins": 90,
                "inventory": [{ "type": "cup", "quantity": 1 }],
                "coinHistory": {
                    "received": [{ "fromUser": "bob", "amount": 5 }],
                    "sent": [{ "toUser": "carol", "amount": 3 }]
                }
            })
        );
    }

    #[test]
    fn empty_view_has_empty_arrays() {
        let value = serde_json::to_value(InfoView::default()).unwrap();
        assert_eq!(value["inventory"], json!([]));
        assert_eq!(value["coinHistory"]["sent"], json!([]));
        assert_eq!(value["coinHistory"]["received"], json!([]));
    }

    #[test]
    fn quantity_of_missing_product_is_zero() {
        assert_eq!(InfoView::default().quantity_of("cup"), 0);
    }
}
