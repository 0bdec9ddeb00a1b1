use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;

use super::server::AppState;
use crate::auth::AuthUser;
use crate::errors::AppError;
use bookstore_types::domain::book::Book;
use bookstore_types::domain::page::Page;
use bookstore_types::ports::Store;

#[derive(Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Deserialize)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Deserialize)]
pub struct SortParams {
    #[serde(rename = "sortBy", alias = "sort_by", default = "default_sort")]
    pub sort_by: String,
}

fn default_sort() -> String {
    "id".into()
}

#[derive(Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

pub(super) fn default_page_size() -> u32 {
    10
}

pub fn routes<R: Store>() -> Router<AppState<R>> {
    Router::new()
        .route("/books", get(list_books::<R>).post(create_book::<R>))
        .route("/books/{id}", get(get_book::<R>).delete(delete_book::<R>))
        .route("/books/genre/{genre}", get(books_by_genre::<R>))
        .route("/books/title/{title}", get(books_by_title::<R>))
        .route("/books/author/{author}", get(books_by_author::<R>))
        .route("/books/price", get(books_by_price::<R>))
        .route("/books/sorted", get(sorted_books::<R>))
        .route("/books/pagination", get(paginated_books::<R>))
}

async fn create_book<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = state
        .books
        .create_book(
            &caller,
            payload.title,
            payload.author,
            payload.description,
            payload.price_cents,
            payload.genres,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book<R: Store>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(state.books.get_book(id).await?))
}

async fn list_books<R: Store>(
    State(state): State<AppState<R>>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.books.list_books().await?))
}

async fn delete_book<R: Store>(
    State(state): State<AppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.books.delete_book(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn books_by_genre<R: Store>(
    State(state): State<AppState<R>>,
    Path(genre): Path<String>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.books.books_by_genre(&genre).await?))
}

async fn books_by_title<R: Store>(
    State(state): State<AppState<R>>,
    Path(title): Path<String>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.books.search_by_title(&title).await?))
}

async fn books_by_author<R: Store>(
    State(state): State<AppState<R>>,
    Path(author): Path<String>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.books.search_by_author(&author).await?))
}

async fn books_by_price<R: Store>(
    State(state): State<AppState<R>>,
    Query(range): Query<PriceRange>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(
        state
            .books
            .books_in_price_range(range.min, range.max)
            .await?,
    ))
}

async fn sorted_books<R: Store>(
    State(state): State<AppState<R>>,
    Query(params): Query<SortParams>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.books.sorted_books(&params.sort_by).await?))
}

async fn paginated_books<R: Store>(
    State(state): State<AppState<R>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Book>>, AppError> {
    Ok(Json(
        state
            .books
            .paginated_books(params.page, params.size)
            .await?,
    ))
}
