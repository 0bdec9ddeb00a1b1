use async_trait::async_trait;

use super::RepoError;
use crate::domain::order::{NewOrder, Order, OrderStatus};

#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError>;
    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError>;
    async fn list_orders(&self) -> Result<Vec<Order>, RepoError>;
    async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, RepoError>;
    async fn update_order(
        &self,
        id: i64,
        total_cents: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepoError>;
    async fn delete_order(&self, id: i64) -> Result<bool, RepoError>;
    /// Copies the cart's current lines into a pending order for `user_id` and
    /// empties the cart as one unit of work. An empty cart is `Rejected`.
    async fn checkout(&self, cart_id: i64, user_id: i64) -> Result<Order, RepoError>;
}
