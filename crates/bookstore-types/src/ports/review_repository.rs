use async_trait::async_trait;

use super::RepoError;
use crate::domain::review::{NewReview, Review};

#[async_trait]
pub trait ReviewRepository: Send + Sync + 'static {
    async fn create_review(&self, review: NewReview) -> Result<Review, RepoError>;
    async fn get_review(&self, id: i64) -> Result<Option<Review>, RepoError>;
    /// All reviews of a book in id order, approved or not.
    async fn reviews_for_book(&self, book_id: i64) -> Result<Vec<Review>, RepoError>;
    async fn approve_review(&self, id: i64) -> Result<Option<Review>, RepoError>;
    async fn delete_review(&self, id: i64) -> Result<bool, RepoError>;
}
