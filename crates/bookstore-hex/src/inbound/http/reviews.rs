use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, put},
    Extension, Json, Router,
};
use serde::Deserialize;

use super::books::default_page_size;
use super::server::AppState;
use crate::auth::AuthUser;
use crate::errors::AppError;
use bookstore_types::domain::page::Page;
use bookstore_types::domain::review::{Review, ReviewSort};
use bookstore_types::ports::Store;

#[derive(Deserialize)]
pub struct NewReviewParams {
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
    #[serde(rename = "sortBy", alias = "sort_by")]
    pub sort_by: Option<String>,
}

pub fn routes<R: Store>() -> Router<AppState<R>> {
    Router::new()
        .route(
            "/api/books/{book_id}/reviews",
            get(list_reviews::<R>).post(add_review::<R>),
        )
        .route(
            "/api/books/{book_id}/reviews/{review_id}/approve",
            put(approve_review::<R>),
        )
        .route(
            "/api/books/{book_id}/reviews/{review_id}",
            delete(delete_review::<R>),
        )
}

async fn add_review<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(book_id): Path<i64>,
    Query(params): Query<NewReviewParams>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let review = state
        .reviews
        .add_review(&caller, book_id, params.rating, params.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn list_reviews<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(book_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Review>>, AppError> {
    let sort = ReviewSort::parse(params.sort_by.as_deref());
    let page = state
        .reviews
        .list_reviews(&caller, book_id, params.page, params.size, sort)
        .await?;
    Ok(Json(page))
}

async fn approve_review<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path((book_id, review_id)): Path<(i64, i64)>,
) -> Result<Json<Review>, AppError> {
    Ok(Json(
        state
            .reviews
            .approve_review(&caller, book_id, review_id)
            .await?,
    ))
}

async fn delete_review<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path((book_id, review_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    state
        .reviews
        .delete_review(&caller, book_id, review_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
