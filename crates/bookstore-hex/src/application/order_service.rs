use crate::errors::AppError;
use bookstore_types::domain::order::{NewOrder, Order, OrderItem, OrderStatus};
use bookstore_types::ports::Store;

pub struct OrderService<R: Store> {
    repo: R,
}

impl<R: Store> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn create_order(
        &self,
        user_id: i64,
        total_cents: i64,
        status: OrderStatus,
        items: Vec<OrderItem>,
    ) -> Result<Order, AppError> {
        if self.repo.get_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("user {}", user_id)));
        }
        let order = NewOrder::new(user_id, total_cents, status, items)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let created = self.repo.create_order(order).await?;
        tracing::info!(order_id = created.id, user_id, "order created");
        Ok(created)
    }

    pub async fn get_order(&self, id: i64) -> Result<Order, AppError> {
        match self.repo.get_order(id).await? {
            Some(o) => Ok(o),
            None => Err(AppError::NotFound(format!("order {}", id))),
        }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.repo.list_orders().await?)
    }

    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        Ok(self.repo.list_orders_for_user(user_id).await?)
    }

    pub async fn update_order(
        &self,
        id: i64,
        total_cents: i64,
        status: OrderStatus,
    ) -> Result<Order, AppError> {
        if total_cents < 0 {
            return Err(AppError::BadRequest("total must not be negative".into()));
        }
        match self.repo.update_order(id, total_cents, status).await? {
            Some(o) => Ok(o),
            None => Err(AppError::NotFound(format!("order {}", id))),
        }
    }

    pub async fn delete_order(&self, id: i64) -> Result<(), AppError> {
        if self.repo.delete_order(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("order {}", id)))
        }
    }
}
