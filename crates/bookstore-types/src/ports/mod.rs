pub mod book_repository;
pub mod cart_repository;
pub mod order_repository;
pub mod review_repository;
pub mod user_repository;

pub use book_repository::{BookFilter, BookRepository};
pub use cart_repository::CartRepository;
pub use order_repository::OrderRepository;
pub use review_repository::ReviewRepository;
pub use user_repository::UserRepository;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("db error: {0}")]
    DbError(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// The stored data does not allow the requested change.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Every port at once; what the application layer is generic over.
pub trait Store:
    UserRepository
    + BookRepository
    + CartRepository
    + OrderRepository
    + ReviewRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> Store for T where
    T: UserRepository
        + BookRepository
        + CartRepository
        + OrderRepository
        + ReviewRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
