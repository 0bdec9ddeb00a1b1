use async_trait::async_trait;

use super::RepoError;
use crate::domain::book::{Book, BookSort, NewBook};

#[derive(Debug, Clone, PartialEq)]
pub enum BookFilter {
    /// Exact genre, case-insensitive.
    Genre(String),
    TitleContains(String),
    AuthorContains(String),
    PriceBetween { min_cents: i64, max_cents: i64 },
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookFilter::Genre(g) => book.has_genre(g),
            BookFilter::TitleContains(t) => book.title.to_lowercase().contains(&t.to_lowercase()),
            BookFilter::AuthorContains(a) => {
                book.author.to_lowercase().contains(&a.to_lowercase())
            }
            BookFilter::PriceBetween {
                min_cents,
                max_cents,
            } => (*min_cents..=*max_cents).contains(&book.price_cents),
        }
    }
}

/// Books returned from every method carry review metrics computed from approved reviews.
#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    async fn create_book(&self, book: NewBook) -> Result<Book, RepoError>;
    async fn get_book(&self, id: i64) -> Result<Option<Book>, RepoError>;
    async fn list_books(&self, sort: BookSort) -> Result<Vec<Book>, RepoError>;
    async fn search_books(&self, filter: BookFilter) -> Result<Vec<Book>, RepoError>;
    /// One page ordered by id, plus the total number of books.
    async fn page_books(&self, page: u32, size: u32) -> Result<(Vec<Book>, u64), RepoError>;
    async fn delete_book(&self, id: i64) -> Result<bool, RepoError>;
}
