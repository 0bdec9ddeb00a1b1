use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;

use super::server::AppState;
use crate::application::CartTarget;
use crate::auth::AuthUser;
use crate::errors::AppError;
use bookstore_types::domain::cart::Cart;
use bookstore_types::domain::order::Order;
use bookstore_types::ports::Store;

#[derive(Deserialize)]
pub struct ItemParams {
    #[serde(rename = "bookId", alias = "book_id")]
    pub book_id: i64,
    pub quantity: i64,
}

#[derive(Deserialize)]
pub struct CreateCartParams {
    pub name: String,
}

pub fn routes<R: Store>() -> Router<AppState<R>> {
    Router::new()
        .route("/users/{user_id}/cart", get(default_cart::<R>))
        .route("/users/{user_id}/carts", get(list_carts::<R>))
        .route("/users/{user_id}/cart/create", post(create_cart::<R>))
        .route("/users/{user_id}/cart/add", post(add_default::<R>))
        .route("/users/{user_id}/cart/remove", delete(remove_default::<R>))
        .route("/users/{user_id}/cart/checkout", post(checkout_default::<R>))
        .route("/users/{user_id}/cart/clear", delete(clear_default::<R>))
        .route(
            "/users/{user_id}/cart/{cart_id}",
            get(get_cart::<R>).delete(delete_cart::<R>),
        )
        .route("/users/{user_id}/cart/{cart_id}/add", post(add_named::<R>))
        .route(
            "/users/{user_id}/cart/{cart_id}/remove",
            delete(remove_named::<R>),
        )
        .route(
            "/users/{user_id}/cart/{cart_id}/checkout",
            post(checkout_named::<R>),
        )
        .route(
            "/users/{user_id}/cart/{cart_id}/clear",
            delete(clear_named::<R>),
        )
}

async fn default_cart<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<Cart>, AppError> {
    caller.ensure_is(user_id)?;
    Ok(Json(
        state.carts.get_cart(user_id, CartTarget::Default).await?,
    ))
}

async fn list_carts<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Cart>>, AppError> {
    caller.ensure_is(user_id)?;
    Ok(Json(state.carts.list_carts(user_id).await?))
}

async fn create_cart<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    Query(params): Query<CreateCartParams>,
) -> Result<(StatusCode, Json<Cart>), AppError> {
    caller.ensure_is(user_id)?;
    let cart = state.carts.create_cart(user_id, &params.name).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

async fn get_cart<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path((user_id, cart_id)): Path<(i64, i64)>,
) -> Result<Json<Cart>, AppError> {
    caller.ensure_is(user_id)?;
    Ok(Json(
        state
            .carts
            .get_cart(user_id, CartTarget::Id(cart_id))
            .await?,
    ))
}

async fn delete_cart<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path((user_id, cart_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    caller.ensure_is(user_id)?;
    state.carts.delete_cart(user_id, cart_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_item<R: Store>(
    state: &AppState<R>,
    caller: &AuthUser,
    user_id: i64,
    target: CartTarget,
    params: ItemParams,
) -> Result<Json<Cart>, AppError> {
    caller.ensure_is(user_id)?;
    let cart = state
        .carts
        .add_item(user_id, target, params.book_id, params.quantity)
        .await?;
    Ok(Json(cart))
}

async fn remove_item<R: Store>(
    state: &AppState<R>,
    caller: &AuthUser,
    user_id: i64,
    target: CartTarget,
    params: ItemParams,
) -> Result<Json<Cart>, AppError> {
    caller.ensure_is(user_id)?;
    let cart = state
        .carts
        .remove_item(user_id, target, params.book_id, params.quantity)
        .await?;
    Ok(Json(cart))
}

async fn checkout<R: Store>(
    state: &AppState<R>,
    caller: &AuthUser,
    user_id: i64,
    target: CartTarget,
) -> Result<(StatusCode, Json<Order>), AppError> {
    caller.ensure_is(user_id)?;
    let order = state.carts.checkout(user_id, target).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn clear<R: Store>(
    state: &AppState<R>,
    caller: &AuthUser,
    user_id: i64,
    target: CartTarget,
) -> Result<Json<Cart>, AppError> {
    caller.ensure_is(user_id)?;
    Ok(Json(state.carts.clear_cart(user_id, target).await?))
}

async fn add_default<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    Query(params): Query<ItemParams>,
) -> Result<Json<Cart>, AppError> {
    add_item(&state, &caller, user_id, CartTarget::Default, params).await
}

async fn add_named<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path((user_id, cart_id)): Path<(i64, i64)>,
    Query(params): Query<ItemParams>,
) -> Result<Json<Cart>, AppError> {
    add_item(&state, &caller, user_id, CartTarget::Id(cart_id), params).await
}

async fn remove_default<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    Query(params): Query<ItemParams>,
) -> Result<Json<Cart>, AppError> {
    remove_item(&state, &caller, user_id, CartTarget::Default, params).await
}

async fn remove_named<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path((user_id, cart_id)): Path<(i64, i64)>,
    Query(params): Query<ItemParams>,
) -> Result<Json<Cart>, AppError> {
    remove_item(&state, &caller, user_id, CartTarget::Id(cart_id), params).await
}

async fn checkout_default<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    checkout(&state, &caller, user_id, CartTarget::Default).await
}

async fn checkout_named<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path((user_id, cart_id)): Path<(i64, i64)>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    checkout(&state, &caller, user_id, CartTarget::Id(cart_id)).await
}

async fn clear_default<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<Cart>, AppError> {
    clear(&state, &caller, user_id, CartTarget::Default).await
}

async fn clear_named<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path((user_id, cart_id)): Path<(i64, i64)>,
) -> Result<Json<Cart>, AppError> {
    clear(&state, &caller, user_id, CartTarget::Id(cart_id)).await
}
