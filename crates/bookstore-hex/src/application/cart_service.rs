use std::sync::Arc;

use crate::errors::AppError;
use crate::notify::{compose_order_confirmation, Mailer};
use bookstore_types::domain::cart::{Cart, DEFAULT_CART_NAME};
use bookstore_types::domain::order::Order;
use bookstore_types::ports::Store;

/// Which of a user's carts an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartTarget {
    Default,
    Id(i64),
}

pub struct CartService<R: Store> {
    repo: R,
    mailer: Arc<dyn Mailer>,
}

impl<R: Store> CartService<R> {
    pub fn new(repo: R, mailer: Arc<dyn Mailer>) -> Self {
        Self { repo, mailer }
    }

    async fn resolve(&self, user_id: i64, target: CartTarget) -> Result<Cart, AppError> {
        match target {
            CartTarget::Default => match self.repo.default_cart(user_id).await? {
                Some(cart) => Ok(cart),
                None => {
                    tracing::debug!(user_id, "creating missing default cart");
                    Ok(self
                        .repo
                        .create_cart(user_id, DEFAULT_CART_NAME, true)
                        .await?)
                }
            },
            CartTarget::Id(id) => self
                .repo
                .get_cart(id)
                .await?
                .filter(|c| c.user_id == user_id)
                .ok_or_else(|| AppError::NotFound(format!("cart {}", id))),
        }
    }

    async fn store(&self, cart: Cart) -> Result<Cart, AppError> {
        self.repo
            .save_cart_items(cart.id, &cart.items)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("cart {}", cart.id)))
    }

    pub async fn get_cart(&self, user_id: i64, target: CartTarget) -> Result<Cart, AppError> {
        self.resolve(user_id, target).await
    }

    pub async fn list_carts(&self, user_id: i64) -> Result<Vec<Cart>, AppError> {
        Ok(self.repo.list_carts(user_id).await?)
    }

    pub async fn create_cart(&self, user_id: i64, name: &str) -> Result<Cart, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("cart name must not be empty".into()));
        }
        if name == DEFAULT_CART_NAME {
            return Err(AppError::Conflict(format!("cart {name} already exists")));
        }
        let cart = self.repo.create_cart(user_id, name, false).await?;
        tracing::info!(user_id, cart_id = cart.id, "cart created");
        Ok(cart)
    }

    pub async fn delete_cart(&self, user_id: i64, cart_id: i64) -> Result<(), AppError> {
        let cart = self.resolve(user_id, CartTarget::Id(cart_id)).await?;
        if cart.is_default {
            return Err(AppError::BadRequest("the default cart cannot be deleted".into()));
        }
        if !self.repo.delete_cart(cart.id).await? {
            return Err(AppError::NotFound(format!("cart {}", cart_id)));
        }
        Ok(())
    }

    pub async fn add_item(
        &self,
        user_id: i64,
        target: CartTarget,
        book_id: i64,
        quantity: i64,
    ) -> Result<Cart, AppError> {
        if quantity <= 0 {
            return Err(AppError::BadRequest("Quantity must be positive".into()));
        }
        let book = self
            .repo
            .get_book(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", book_id)))?;
        let mut cart = self.resolve(user_id, target).await?;
        cart.add(book.id, &book.title, book.price_cents, quantity)?;
        tracing::debug!(user_id, cart_id = cart.id, book_id, quantity, "item added");
        self.store(cart).await
    }

    pub async fn remove_item(
        &self,
        user_id: i64,
        target: CartTarget,
        book_id: i64,
        quantity: i64,
    ) -> Result<Cart, AppError> {
        if quantity <= 0 {
            return Err(AppError::BadRequest("Quantity must be positive".into()));
        }
        if self.repo.get_book(book_id).await?.is_none() {
            return Err(AppError::NotFound(format!("book {}", book_id)));
        }
        let mut cart = self.resolve(user_id, target).await?;
        cart.remove(book_id, quantity)?;
        self.store(cart).await
    }

    pub async fn clear_cart(&self, user_id: i64, target: CartTarget) -> Result<Cart, AppError> {
        let mut cart = self.resolve(user_id, target).await?;
        cart.clear();
        self.store(cart).await
    }

    /// Turns the cart into a pending order, empties it and mails a confirmation.
    pub async fn checkout(&self, user_id: i64, target: CartTarget) -> Result<Order, AppError> {
        let cart = self.resolve(user_id, target).await?;
        if cart.items.is_empty() {
            return Err(AppError::BadRequest("Cart is empty".into()));
        }
        let user = self
            .repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;

        let order = self.repo.checkout(cart.id, user_id).await?;
        tracing::info!(
            user_id,
            cart_id = cart.id,
            order_id = order.id,
            total_cents = order.total_cents,
            "checkout complete"
        );

        // The order stays committed even when mail delivery fails.
        if let Err(e) = self
            .mailer
            .send(compose_order_confirmation(&user, &order))
            .await
        {
            tracing::error!(order_id = order.id, to = %user.email, error = %e, "order confirmation not sent");
        }
        Ok(order)
    }
}
