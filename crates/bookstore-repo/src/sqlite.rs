use async_trait::async_trait;
use bookstore_types::domain::book::{Book, BookSort, NewBook};
use bookstore_types::domain::cart::{Cart, CartItem, DEFAULT_CART_NAME};
use bookstore_types::domain::order::{NewOrder, Order, OrderItem, OrderStatus};
use bookstore_types::domain::review::{NewReview, Review};
use bookstore_types::domain::user::{NewUser, User, UserUpdate};
use bookstore_types::ports::{
    BookFilter, BookRepository, CartRepository, OrderRepository, RepoError, ReviewRepository,
    UserRepository,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

const BOOK_SELECT: &str = "SELECT b.id, b.title, b.author, b.description, b.price_cents, b.genres_json, b.owner_id,
        (SELECT COUNT(*) FROM reviews r WHERE r.book_id = b.id AND r.approved = 1) AS review_count,
        (SELECT AVG(r.rating) FROM reviews r WHERE r.book_id = b.id AND r.approved = 1) AS avg_rating
     FROM books b";

const ORDER_SELECT: &str =
    "SELECT id, user_id, order_date, total_cents, status, items_json FROM orders";

const REVIEW_SELECT: &str =
    "SELECT id, book_id, user_id, rating, comment, approved, created_at FROM reviews";

#[derive(Clone)]
pub struct SqliteRepo {
    pool: SqlitePool,
}

fn db_err(e: impl std::fmt::Display) -> RepoError {
    RepoError::DbError(e.to_string())
}

fn unique_or_db(e: sqlx::Error, what: String) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Conflict(what),
        _ => db_err(e),
    }
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, RepoError> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(db_err)?
        .with_timezone(&Utc))
}

#[derive(FromRow)]
struct DbUser {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
}

impl From<DbUser> for User {
    fn from(r: DbUser) -> Self {
        User {
            id: r.id,
            username: r.username,
            email: r.email,
            password_hash: r.password_hash,
        }
    }
}

#[derive(FromRow)]
struct DbBook {
    id: i64,
    title: String,
    author: String,
    description: String,
    price_cents: i64,
    genres_json: String,
    owner_id: Option<i64>,
    review_count: i64,
    avg_rating: Option<f64>,
}

impl DbBook {
    fn into_book(self) -> Result<Book, RepoError> {
        let genres: Vec<String> = serde_json::from_str(&self.genres_json).map_err(db_err)?;
        Ok(Book {
            id: self.id,
            title: self.title,
            author: self.author,
            description: self.description,
            price_cents: self.price_cents,
            genres,
            owner_id: self.owner_id,
            number_of_reviews: self.review_count as u32,
            average_rating: self.avg_rating.unwrap_or(0.0),
        })
    }
}

#[derive(FromRow)]
struct DbCart {
    id: i64,
    user_id: i64,
    name: String,
    is_default: bool,
}

#[derive(FromRow)]
struct DbCartLine {
    book_id: i64,
    title: String,
    price_cents: i64,
    quantity: i64,
}

#[derive(FromRow)]
struct DbOrder {
    id: i64,
    user_id: i64,
    order_date: String,
    total_cents: i64,
    status: String,
    items_json: String,
}

impl DbOrder {
    fn into_order(self) -> Result<Order, RepoError> {
        let items: Vec<OrderItem> = serde_json::from_str(&self.items_json).map_err(db_err)?;
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            order_date: parse_ts(&self.order_date)?,
            total_cents: self.total_cents,
            status: OrderStatus::from_db(&self.status),
            items,
        })
    }
}

#[derive(FromRow)]
struct DbReview {
    id: i64,
    book_id: i64,
    user_id: i64,
    rating: i64,
    comment: String,
    approved: bool,
    created_at: String,
}

impl DbReview {
    fn into_review(self) -> Result<Review, RepoError> {
        Ok(Review {
            id: self.id,
            book_id: self.book_id,
            user_id: self.user_id,
            rating: self.rating as u8,
            comment: self.comment,
            approved: self.approved,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

impl SqliteRepo {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        let in_memory = database_url.contains(":memory:");
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if !in_memory {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` is a separate database.
        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let ddl = include_str!("../migrations/0001_init.sql");
        for statement in ddl.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&pool).await?;
        }
        tracing::debug!(database_url, "sqlite schema ready");

        Ok(Self { pool })
    }

    async fn fetch_books(&self, sql: String, binds: &[BindValue<'_>]) -> Result<Vec<Book>, RepoError> {
        let mut query = sqlx::query_as::<_, DbBook>(&sql);
        for b in binds {
            query = match b {
                BindValue::Int(v) => query.bind(*v),
                BindValue::Text(v) => query.bind(*v),
            };
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;
        rows.into_iter().map(DbBook::into_book).collect()
    }

    async fn cart_lines<'e, E>(executor: E, cart_id: i64) -> Result<Vec<CartItem>, RepoError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let rows: Vec<DbCartLine> = sqlx::query_as(
            "SELECT ci.book_id, b.title, b.price_cents, ci.quantity
             FROM cart_items ci JOIN books b ON b.id = ci.book_id
             WHERE ci.cart_id = ? ORDER BY ci.position",
        )
        .bind(cart_id)
        .fetch_all(executor)
        .await
        .map_err(db_err)?;
        Ok(rows
            .into_iter()
            .map(|r| CartItem {
                book_id: r.book_id,
                title: r.title,
                unit_price_cents: r.price_cents,
                quantity: r.quantity as u32,
            })
            .collect())
    }

    async fn hydrate(&self, row: DbCart) -> Result<Cart, RepoError> {
        let items = Self::cart_lines(&self.pool, row.id).await?;
        let mut cart = Cart {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            is_default: row.is_default,
            items,
            total_cents: 0,
        };
        cart.recalculate_total()
            .map_err(|e| RepoError::Rejected(e.to_string()))?;
        Ok(cart)
    }

    async fn insert_order(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        order: &NewOrder,
    ) -> Result<i64, RepoError> {
        let items_json = serde_json::to_string(&order.items).map_err(db_err)?;
        let res = sqlx::query(
            "INSERT INTO orders (user_id, order_date, total_cents, status, items_json)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order.user_id)
        .bind(order.order_date.to_rfc3339())
        .bind(order.total_cents)
        .bind(order.status.as_str())
        .bind(items_json)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;
        Ok(res.last_insert_rowid())
    }
}

enum BindValue<'a> {
    Int(i64),
    Text(&'a str),
}

#[async_trait]
impl UserRepository for SqliteRepo {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let res = sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)")
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| unique_or_db(e, format!("username {} already exists", user.username)))?;
        let id = res.last_insert_rowid();
        sqlx::query("INSERT INTO carts (user_id, name, is_default) VALUES (?, ?, 1)")
            .bind(id)
            .bind(DEFAULT_CART_NAME)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        })
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> =
            sqlx::query_as("SELECT id, username, email, password_hash FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(
            "SELECT id, username, email, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let rows: Vec<DbUser> =
            sqlx::query_as("SELECT id, username, email, password_hash FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<Option<User>, RepoError> {
        let conflict = format!("username {} already exists", update.username);
        let updated = sqlx::query(
            "UPDATE users SET username = ?, email = ?, password_hash = COALESCE(?, password_hash)
             WHERE id = ?",
        )
        .bind(update.username)
        .bind(update.email)
        .bind(update.password_hash)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_or_db(e, conflict))?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user(id).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl BookRepository for SqliteRepo {
    async fn create_book(&self, book: NewBook) -> Result<Book, RepoError> {
        let genres_json = serde_json::to_string(&book.genres).map_err(db_err)?;
        let res = sqlx::query(
            "INSERT INTO books (title, author, description, price_cents, genres_json, owner_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.price_cents)
        .bind(genres_json)
        .bind(book.owner_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(book.into_book(res.last_insert_rowid()))
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>, RepoError> {
        let mut books = self
            .fetch_books(format!("{BOOK_SELECT} WHERE b.id = ?"), &[BindValue::Int(id)])
            .await?;
        Ok(books.pop())
    }

    async fn list_books(&self, sort: BookSort) -> Result<Vec<Book>, RepoError> {
        // `column()` only yields fixed identifiers.
        self.fetch_books(
            format!("{BOOK_SELECT} ORDER BY b.{}, b.id", sort.column()),
            &[],
        )
        .await
    }

    async fn search_books(&self, filter: BookFilter) -> Result<Vec<Book>, RepoError> {
        match &filter {
            BookFilter::Genre(_) => {
                let mut books = self.list_books(BookSort::Id).await?;
                books.retain(|b| filter.matches(b));
                Ok(books)
            }
            BookFilter::TitleContains(t) => {
                self.fetch_books(
                    format!("{BOOK_SELECT} WHERE instr(lower(b.title), lower(?)) > 0 ORDER BY b.id"),
                    &[BindValue::Text(t)],
                )
                .await
            }
            BookFilter::AuthorContains(a) => {
                self.fetch_books(
                    format!("{BOOK_SELECT} WHERE instr(lower(b.author), lower(?)) > 0 ORDER BY b.id"),
                    &[BindValue::Text(a)],
                )
                .await
            }
            BookFilter::PriceBetween {
                min_cents,
                max_cents,
            } => {
                self.fetch_books(
                    format!("{BOOK_SELECT} WHERE b.price_cents BETWEEN ? AND ? ORDER BY b.id"),
                    &[BindValue::Int(*min_cents), BindValue::Int(*max_cents)],
                )
                .await
            }
        }
    }

    async fn page_books(&self, page: u32, size: u32) -> Result<(Vec<Book>, u64), RepoError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        let offset = page as i64 * size as i64;
        let books = self
            .fetch_books(
                format!("{BOOK_SELECT} ORDER BY b.id LIMIT ? OFFSET ?"),
                &[BindValue::Int(size as i64), BindValue::Int(offset)],
            )
            .await?;
        Ok((books, total as u64))
    }

    async fn delete_book(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl CartRepository for SqliteRepo {
    async fn create_cart(
        &self,
        user_id: i64,
        name: &str,
        is_default: bool,
    ) -> Result<Cart, RepoError> {
        let res = sqlx::query("INSERT INTO carts (user_id, name, is_default) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(name)
            .bind(is_default)
            .execute(&self.pool)
            .await
            .map_err(|e| unique_or_db(e, format!("cart {name} already exists")))?;
        Ok(Cart {
            id: res.last_insert_rowid(),
            user_id,
            name: name.to_string(),
            is_default,
            items: Vec::new(),
            total_cents: 0,
        })
    }

    async fn get_cart(&self, id: i64) -> Result<Option<Cart>, RepoError> {
        let row: Option<DbCart> =
            sqlx::query_as("SELECT id, user_id, name, is_default FROM carts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        match row {
            Some(r) => Ok(Some(self.hydrate(r).await?)),
            None => Ok(None),
        }
    }

    async fn default_cart(&self, user_id: i64) -> Result<Option<Cart>, RepoError> {
        let row: Option<DbCart> = sqlx::query_as(
            "SELECT id, user_id, name, is_default FROM carts WHERE user_id = ? AND is_default = 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        match row {
            Some(r) => Ok(Some(self.hydrate(r).await?)),
            None => Ok(None),
        }
    }

    async fn list_carts(&self, user_id: i64) -> Result<Vec<Cart>, RepoError> {
        let rows: Vec<DbCart> = sqlx::query_as(
            "SELECT id, user_id, name, is_default FROM carts WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        let mut carts = Vec::with_capacity(rows.len());
        for r in rows {
            carts.push(self.hydrate(r).await?);
        }
        Ok(carts)
    }

    async fn save_cart_items(
        &self,
        cart_id: i64,
        items: &[CartItem],
    ) -> Result<Option<Cart>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM carts WHERE id = ?")
            .bind(cart_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if exists.is_none() {
            return Ok(None);
        }
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO cart_items (cart_id, book_id, position, quantity) VALUES (?, ?, ?, ?)",
            )
            .bind(cart_id)
            .bind(item.book_id)
            .bind(position as i64)
            .bind(item.quantity as i64)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        self.get_cart(cart_id).await
    }

    async fn delete_cart(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM carts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl OrderRepository for SqliteRepo {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let id = Self::insert_order(&mut tx, &order).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(order.into_order(id))
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError> {
        let row: Option<DbOrder> = sqlx::query_as(&format!("{ORDER_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|r| r.into_order()).transpose()
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        let rows: Vec<DbOrder> = sqlx::query_as(&format!("{ORDER_SELECT} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(|r| r.into_order()).collect()
    }

    async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, RepoError> {
        let rows: Vec<DbOrder> =
            sqlx::query_as(&format!("{ORDER_SELECT} WHERE user_id = ? ORDER BY id"))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        rows.into_iter().map(|r| r.into_order()).collect()
    }

    async fn update_order(
        &self,
        id: i64,
        total_cents: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        let updated = sqlx::query("UPDATE orders SET total_cents = ?, status = ? WHERE id = ?")
            .bind(total_cents)
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_order(id).await
    }

    async fn delete_order(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn checkout(&self, cart_id: i64, user_id: i64) -> Result<Order, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        // Lines are read inside the transaction so the order and the delete see the same rows.
        let lines = Self::cart_lines(&mut *tx, cart_id).await?;
        let order = NewOrder::from_cart_items(user_id, &lines)
            .map_err(|e| RepoError::Rejected(e.to_string()))?;
        let id = Self::insert_order(&mut tx, &order).await?;
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(order.into_order(id))
    }
}

#[async_trait]
impl ReviewRepository for SqliteRepo {
    async fn create_review(&self, review: NewReview) -> Result<Review, RepoError> {
        let res = sqlx::query(
            "INSERT INTO reviews (book_id, user_id, rating, comment, approved, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(review.book_id)
        .bind(review.user_id)
        .bind(review.rating as i64)
        .bind(&review.comment)
        .bind(review.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(review.into_review(res.last_insert_rowid()))
    }

    async fn get_review(&self, id: i64) -> Result<Option<Review>, RepoError> {
        let row: Option<DbReview> = sqlx::query_as(&format!("{REVIEW_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|r| r.into_review()).transpose()
    }

    async fn reviews_for_book(&self, book_id: i64) -> Result<Vec<Review>, RepoError> {
        let rows: Vec<DbReview> =
            sqlx::query_as(&format!("{REVIEW_SELECT} WHERE book_id = ? ORDER BY id"))
                .bind(book_id)
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        rows.into_iter().map(|r| r.into_review()).collect()
    }

    async fn approve_review(&self, id: i64) -> Result<Option<Review>, RepoError> {
        let updated = sqlx::query("UPDATE reviews SET approved = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_review(id).await
    }

    async fn delete_review(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}
