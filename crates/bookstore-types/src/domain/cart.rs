use serde::{Deserialize, Serialize};

/// Upper bound on the sum of quantities across every line of a cart.
pub const MAX_TOTAL_QUANTITY: u32 = 10;

pub const DEFAULT_CART_NAME: &str = "default";

/// A cart line. `title` and `unit_price_cents` mirror the book's current values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub book_id: i64,
    pub title: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub is_default: bool,
    pub items: Vec<CartItem>,
    pub total_cents: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CartRuleError {
    #[error("Quantity must be positive")]
    NonPositiveQuantity,
    #[error("Cannot add more items. Maximum total quantity exceeded: {}", MAX_TOTAL_QUANTITY)]
    LimitExceeded,
    #[error("Book not found in cart")]
    NotInCart,
    #[error("Cannot remove more quantity than present in the cart")]
    RemoveTooMany,
    #[error("Cart total is out of range")]
    TotalOverflow,
}

/// Sum of `unit_price_cents * quantity` over `items`, or `None` on overflow.
pub fn checked_total(items: &[CartItem]) -> Option<i64> {
    items.iter().try_fold(0i64, |acc, i| {
        i.unit_price_cents
            .checked_mul(i64::from(i.quantity))
            .and_then(|line| acc.checked_add(line))
    })
}

impl Cart {
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn recalculate_total(&mut self) -> Result<(), CartRuleError> {
        self.total_cents = checked_total(&self.items).ok_or(CartRuleError::TotalOverflow)?;
        Ok(())
    }

    /// Adds `quantity` copies of a book, merging into an existing line.
    pub fn add(
        &mut self,
        book_id: i64,
        title: &str,
        unit_price_cents: i64,
        quantity: i64,
    ) -> Result<(), CartRuleError> {
        if quantity <= 0 {
            return Err(CartRuleError::NonPositiveQuantity);
        }
        let new_total = self.total_quantity() as i64 + quantity;
        if new_total > MAX_TOTAL_QUANTITY as i64 {
            return Err(CartRuleError::LimitExceeded);
        }
        let quantity = quantity as u32;
        let mut items = self.items.clone();
        match items.iter_mut().find(|i| i.book_id == book_id) {
            Some(line) => {
                line.quantity += quantity;
                line.title = title.to_string();
                line.unit_price_cents = unit_price_cents;
            }
            None => items.push(CartItem {
                book_id,
                title: title.to_string(),
                unit_price_cents,
                quantity,
            }),
        }
        // The cart is left untouched when the new total does not fit.
        self.total_cents = checked_total(&items).ok_or(CartRuleError::TotalOverflow)?;
        self.items = items;
        Ok(())
    }

    /// Removes `quantity` copies of a book; the line disappears when it reaches zero.
    pub fn remove(&mut self, book_id: i64, quantity: i64) -> Result<(), CartRuleError> {
        if quantity <= 0 {
            return Err(CartRuleError::NonPositiveQuantity);
        }
        let idx = self
            .items
            .iter()
            .position(|i| i.book_id == book_id)
            .ok_or(CartRuleError::NotInCart)?;
        let current = self.items[idx].quantity as i64;
        if quantity > current {
            return Err(CartRuleError::RemoveTooMany);
        }
        if current - quantity > 0 {
            self.items[idx].quantity = (current - quantity) as u32;
        } else {
            self.items.remove(idx);
        }
        self.recalculate_total()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.total_cents = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_cart() -> Cart {
        Cart {
            id: 1,
            user_id: 1,
            name: DEFAULT_CART_NAME.into(),
            is_default: true,
            items: vec![],
            total_cents: 0,
        }
    }

    #[test]
    fn add_merges_lines_and_totals() {
        let mut cart = empty_cart();
        cart.add(1, "A", 1999, 2).unwrap();
        cart.add(2, "B", 500, 1).unwrap();
        cart.add(1, "A", 1999, 1).unwrap();
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.total_cents, 3 * 1999 + 500);
    }

    #[test]
    fn add_rejects_bad_quantities_and_limit() {
        let mut cart = empty_cart();
        assert_eq!(cart.add(1, "A", 1, 0), Err(CartRuleError::NonPositiveQuantity));
        assert_eq!(cart.add(1, "A", 1, -3), Err(CartRuleError::NonPositiveQuantity));
        cart.add(1, "A", 1, 10).unwrap();
        assert_eq!(cart.add(2, "B", 1, 1), Err(CartRuleError::LimitExceeded));
        assert_eq!(cart.total_quantity(), 10);
    }

    #[test]
    fn remove_paths() {
        let mut cart = empty_cart();
        cart.add(1, "A", 100, 3).unwrap();
        assert_eq!(cart.remove(2, 1), Err(CartRuleError::NotInCart));
        assert_eq!(cart.remove(1, 4), Err(CartRuleError::RemoveTooMany));
        assert_eq!(cart.remove(1, 0), Err(CartRuleError::NonPositiveQuantity));
        cart.remove(1, 2).unwrap();
        assert_eq!(cart.items[0].quantity, 1);
        assert_eq!(cart.total_cents, 100);
        cart.remove(1, 1).unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_cents, 0);
    }

    #[test]
    fn overflowing_total_is_rejected_without_changing_the_cart() {
        let mut cart = empty_cart();
        cart.add(2, "Cheap", 100, 1).unwrap();
        assert_eq!(
            cart.add(1, "Pricey", i64::MAX / 2 + 1, 2),
            Err(CartRuleError::TotalOverflow)
        );
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_cents, 100);

        cart.items.push(CartItem {
            book_id: 3,
            title: "Huge".into(),
            unit_price_cents: i64::MAX,
            quantity: 1,
        });
        assert_eq!(cart.recalculate_total(), Err(CartRuleError::TotalOverflow));
    }
}
