use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartItem;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Cancelled,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Completed => "COMPLETED",
        }
    }

    /// Lenient parse used when reading stored rows; unknown values fall back to `Pending`.
    pub fn from_db(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "CONFIRMED" => OrderStatus::Confirmed,
            "SHIPPED" => OrderStatus::Shipped,
            "CANCELLED" => OrderStatus::Cancelled,
            "COMPLETED" => OrderStatus::Completed,
            _ => OrderStatus::Pending,
        }
    }
}

/// A purchased line. `price_cents` is the unit price captured when the order was placed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub book_id: i64,
    pub title: String,
    pub quantity: u32,
    pub price_cents: i64,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            book_id: item.book_id,
            title: item.title.clone(),
            quantity: item.quantity,
            price_cents: item.unit_price_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_cents: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// An order that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

impl NewOrder {
    pub fn new(
        user_id: i64,
        total_cents: i64,
        status: OrderStatus,
        items: Vec<OrderItem>,
    ) -> anyhow::Result<Self> {
        if total_cents < 0 {
            anyhow::bail!("total must not be negative");
        }
        for it in &items {
            if it.quantity == 0 {
                anyhow::bail!("item quantity must be > 0");
            }
        }
        Ok(Self {
            user_id,
            order_date: Utc::now(),
            total_cents,
            status,
            items,
        })
    }

    /// Builds a pending order from cart lines; the total is the sum of the lines.
    pub fn from_cart_items(user_id: i64, items: &[CartItem]) -> anyhow::Result<Self> {
        if items.is_empty() {
            anyhow::bail!("Cart is empty");
        }
        let items: Vec<OrderItem> = items.iter().map(OrderItem::from).collect();
        let total = items
            .iter()
            .try_fold(0i64, |acc, it| {
                it.price_cents
                    .checked_mul(i64::from(it.quantity))
                    .and_then(|line| acc.checked_add(line))
            })
            .ok_or_else(|| anyhow::anyhow!("order total is out of range"))?;
        Self::new(user_id, total, OrderStatus::Pending, items)
    }

    pub fn into_order(self, id: i64) -> Order {
        Order {
            id,
            user_id: self.user_id,
            order_date: self.order_date,
            total_cents: self.total_cents,
            status: self.status,
            items: self.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(book_id: i64, quantity: u32, price: i64) -> CartItem {
        CartItem {
            book_id,
            title: format!("Book {book_id}"),
            unit_price_cents: price,
            quantity,
        }
    }

    #[test]
    fn from_cart_items_computes_total_and_defaults_pending() {
        let order = NewOrder::from_cart_items(7, &[line(1, 2, 500), line(2, 1, 250)]).unwrap();
        assert_eq!(order.total_cents, 1250);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].price_cents, 500);
    }

    #[test]
    fn validation_errors() {
        assert!(NewOrder::from_cart_items(1, &[]).is_err());
        assert!(NewOrder::from_cart_items(1, &[line(1, 2, i64::MAX / 2 + 1)]).is_err());
        assert!(NewOrder::new(1, -5, OrderStatus::Pending, vec![]).is_err());
        let zero_qty = NewOrder::new(
            1,
            100,
            OrderStatus::Pending,
            vec![OrderItem {
                book_id: 1,
                title: "A".into(),
                quantity: 0,
                price_cents: 100,
            }],
        );
        assert!(zero_qty.is_err());
    }

    #[test]
    fn status_serializes_upper_case() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
        assert_eq!(OrderStatus::from_db("shipped"), OrderStatus::Shipped);
        assert_eq!(OrderStatus::from_db("???"), OrderStatus::Pending);
    }
}
