use async_trait::async_trait;

use super::RepoError;
use crate::domain::cart::{Cart, CartItem};

#[async_trait]
pub trait CartRepository: Send + Sync + 'static {
    /// Names are unique per user; a clash is a `Conflict`.
    async fn create_cart(&self, user_id: i64, name: &str, is_default: bool)
        -> Result<Cart, RepoError>;
    async fn get_cart(&self, id: i64) -> Result<Option<Cart>, RepoError>;
    async fn default_cart(&self, user_id: i64) -> Result<Option<Cart>, RepoError>;
    async fn list_carts(&self, user_id: i64) -> Result<Vec<Cart>, RepoError>;
    /// Replaces every line of the cart. Only `book_id` and `quantity` are persisted.
    async fn save_cart_items(&self, cart_id: i64, items: &[CartItem])
        -> Result<Option<Cart>, RepoError>;
    async fn delete_cart(&self, id: i64) -> Result<bool, RepoError>;
}
