use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;

use super::server::AppState;
use crate::auth::{AuthUser, Claims, IssuedToken};
use crate::errors::AppError;
use bookstore_types::domain::user::User;
use bookstore_types::ports::Store;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

pub fn public_routes<R: Store>() -> Router<AppState<R>> {
    Router::new()
        .route("/api/users/register", post(register::<R>))
        .route("/api/users/login", post(login::<R>))
}

pub fn routes<R: Store>() -> Router<AppState<R>> {
    Router::new()
        .route("/api/users", get(list_users::<R>))
        .route("/api/users/logout", post(logout::<R>))
        .route(
            "/api/users/{id}",
            get(get_user::<R>)
                .put(update_user::<R>)
                .delete(delete_user::<R>),
        )
}

async fn register<R: Store>(
    State(state): State<AppState<R>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state
        .users
        .register(payload.username, payload.email, payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login<R: Store>(
    State(state): State<AppState<R>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<IssuedToken>, AppError> {
    let token = state
        .users
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(token))
}

async fn logout<R: Store>(
    State(state): State<AppState<R>>,
    Extension(claims): Extension<Claims>,
) -> StatusCode {
    state.users.logout(&claims);
    StatusCode::NO_CONTENT
}

async fn list_users<R: Store>(
    State(state): State<AppState<R>>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.list_users().await?))
}

async fn get_user<R: Store>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get_user(id).await?))
}

async fn update_user<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let user = state
        .users
        .update_user(&caller, id, payload.username, payload.email, payload.password)
        .await?;
    Ok(Json(user))
}

async fn delete_user<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.users.delete_user(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
