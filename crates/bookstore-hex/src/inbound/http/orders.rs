use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;

use super::server::AppState;
use crate::auth::AuthUser;
use crate::errors::AppError;
use bookstore_types::domain::order::{Order, OrderItem, OrderStatus};
use bookstore_types::ports::Store;

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub total_cents: i64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub total_cents: i64,
    pub status: OrderStatus,
}

pub fn routes<R: Store>() -> Router<AppState<R>> {
    Router::new()
        .route("/orders", get(list_orders::<R>).post(create_order::<R>))
        .route(
            "/orders/{id}",
            get(get_order::<R>)
                .put(update_order::<R>)
                .delete(delete_order::<R>),
        )
        .route("/users/{user_id}/orders", get(user_orders::<R>))
}

async fn create_order<R: Store>(
    State(state): State<AppState<R>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state
        .orders
        .create_order(
            payload.user_id,
            payload.total_cents,
            payload.status,
            payload.items,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order<R: Store>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.orders.get_order(id).await?))
}

async fn list_orders<R: Store>(
    State(state): State<AppState<R>>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.orders.list_orders().await?))
}

async fn update_order<R: Store>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let updated = state
        .orders
        .update_order(id, payload.total_cents, payload.status)
        .await?;
    Ok(Json(updated))
}

async fn delete_order<R: Store>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn user_orders<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Order>>, AppError> {
    caller.ensure_is(user_id)?;
    Ok(Json(state.orders.orders_for_user(user_id).await?))
}
