#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a repo feature: `memory` or `sqlite`.");

use bookstore_types::domain::book::{Book, BookSort, NewBook};
use bookstore_types::domain::cart::{Cart, CartItem};
use bookstore_types::domain::order::{NewOrder, Order, OrderStatus};
use bookstore_types::domain::review::{NewReview, Review};
use bookstore_types::domain::user::{NewUser, User, UserUpdate};
use bookstore_types::ports::{
    BookFilter, BookRepository, CartRepository, OrderRepository, RepoError, ReviewRepository,
    UserRepository,
};

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(all(feature = "sqlite", not(feature = "memory")))]
const DEFAULT_DATABASE_URL: &str = "sqlite://bookstore.db";

/// The storage backend picked at startup.
#[derive(Clone)]
pub enum Repo {
    #[cfg(feature = "memory")]
    Memory(memory::InMemoryRepo),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteRepo),
}

pub async fn build_repo(url: Option<&str>) -> anyhow::Result<Repo> {
    Repo::build_repo(url).await
}

impl Repo {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        if database_url.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without the sqlite feature");
        }
        Ok(Repo::Memory(memory::InMemoryRepo::new()))
    }

    #[cfg(all(feature = "sqlite", not(feature = "memory")))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or(DEFAULT_DATABASE_URL);
        Ok(Repo::Sqlite(sqlite::SqliteRepo::new(url).await?))
    }

    // Both features: a configured URL selects sqlite, otherwise memory.
    #[cfg(all(feature = "sqlite", feature = "memory"))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        match database_url {
            Some(url) => Ok(Repo::Sqlite(sqlite::SqliteRepo::new(url).await?)),
            None => Ok(Repo::Memory(memory::InMemoryRepo::new())),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(_) => "sqlite",
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $repo:ident => $call:expr) => {
        match $self {
            #[cfg(feature = "memory")]
            Repo::Memory($repo) => $call.await,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite($repo) => $call.await,
        }
    };
}

#[async_trait::async_trait]
impl UserRepository for Repo {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        dispatch!(self, r => r.create_user(user))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError> {
        dispatch!(self, r => r.get_user(id))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        dispatch!(self, r => r.find_user_by_username(username))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        dispatch!(self, r => r.list_users())
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<Option<User>, RepoError> {
        dispatch!(self, r => r.update_user(id, update))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_user(id))
    }
}

#[async_trait::async_trait]
impl BookRepository for Repo {
    async fn create_book(&self, book: NewBook) -> Result<Book, RepoError> {
        dispatch!(self, r => r.create_book(book))
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>, RepoError> {
        dispatch!(self, r => r.get_book(id))
    }

    async fn list_books(&self, sort: BookSort) -> Result<Vec<Book>, RepoError> {
        dispatch!(self, r => r.list_books(sort))
    }

    async fn search_books(&self, filter: BookFilter) -> Result<Vec<Book>, RepoError> {
        dispatch!(self, r => r.search_books(filter))
    }

    async fn page_books(&self, page: u32, size: u32) -> Result<(Vec<Book>, u64), RepoError> {
        dispatch!(self, r => r.page_books(page, size))
    }

    async fn delete_book(&self, id: i64) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_book(id))
    }
}

#[async_trait::async_trait]
impl CartRepository for Repo {
    async fn create_cart(
        &self,
        user_id: i64,
        name: &str,
        is_default: bool,
    ) -> Result<Cart, RepoError> {
        dispatch!(self, r => r.create_cart(user_id, name, is_default))
    }

    async fn get_cart(&self, id: i64) -> Result<Option<Cart>, RepoError> {
        dispatch!(self, r => r.get_cart(id))
    }

    async fn default_cart(&self, user_id: i64) -> Result<Option<Cart>, RepoError> {
        dispatch!(self, r => r.default_cart(user_id))
    }

    async fn list_carts(&self, user_id: i64) -> Result<Vec<Cart>, RepoError> {
        dispatch!(self, r => r.list_carts(user_id))
    }

    async fn save_cart_items(
        &self,
        cart_id: i64,
        items: &[CartItem],
    ) -> Result<Option<Cart>, RepoError> {
        dispatch!(self, r => r.save_cart_items(cart_id, items))
    }

    async fn delete_cart(&self, id: i64) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_cart(id))
    }
}

#[async_trait::async_trait]
impl OrderRepository for Repo {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError> {
        dispatch!(self, r => r.create_order(order))
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError> {
        dispatch!(self, r => r.get_order(id))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        dispatch!(self, r => r.list_orders())
    }

    async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, RepoError> {
        dispatch!(self, r => r.list_orders_for_user(user_id))
    }

    async fn update_order(
        &self,
        id: i64,
        total_cents: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        dispatch!(self, r => r.update_order(id, total_cents, status))
    }

    async fn delete_order(&self, id: i64) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_order(id))
    }

    async fn checkout(&self, cart_id: i64, user_id: i64) -> Result<Order, RepoError> {
        dispatch!(self, r => r.checkout(cart_id, user_id))
    }
}

#[async_trait::async_trait]
impl ReviewRepository for Repo {
    async fn create_review(&self, review: NewReview) -> Result<Review, RepoError> {
        dispatch!(self, r => r.create_review(review))
    }

    async fn get_review(&self, id: i64) -> Result<Option<Review>, RepoError> {
        dispatch!(self, r => r.get_review(id))
    }

    async fn reviews_for_book(&self, book_id: i64) -> Result<Vec<Review>, RepoError> {
        dispatch!(self, r => r.reviews_for_book(book_id))
    }

    async fn approve_review(&self, id: i64) -> Result<Option<Review>, RepoError> {
        dispatch!(self, r => r.approve_review(id))
    }

    async fn delete_review(&self, id: i64) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_review(id))
    }
}
