use async_trait::async_trait;
use bookstore_types::domain::book::{Book, BookSort, NewBook};
use bookstore_types::domain::cart::{Cart, CartItem, DEFAULT_CART_NAME};
use bookstore_types::domain::order::{NewOrder, Order, OrderStatus};
use bookstore_types::domain::review::{NewReview, Review};
use bookstore_types::domain::user::{NewUser, User, UserUpdate};
use bookstore_types::ports::{
    BookFilter, BookRepository, CartRepository, OrderRepository, RepoError, ReviewRepository,
    UserRepository,
};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct StoredCart {
    id: i64,
    user_id: i64,
    name: String,
    is_default: bool,
    lines: Vec<(i64, u32)>,
}

#[derive(Default)]
struct Sequence(AtomicI64);

impl Sequence {
    fn next(&self) -> i64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[derive(Default)]
struct Tables {
    users: DashMap<i64, User>,
    books: DashMap<i64, Book>,
    carts: DashMap<i64, StoredCart>,
    orders: DashMap<i64, Order>,
    reviews: DashMap<i64, Review>,
    user_seq: Sequence,
    book_seq: Sequence,
    cart_seq: Sequence,
    order_seq: Sequence,
    review_seq: Sequence,
    // Serialises writes that check a uniqueness constraint or touch several tables.
    write_lock: Mutex<()>,
}

#[derive(Clone, Default)]
pub struct InMemoryRepo {
    tables: Arc<Tables>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, RepoError> {
        self.tables
            .write_lock
            .lock()
            .map_err(|e| RepoError::DbError(e.to_string()))
    }

    fn with_metrics(&self, mut book: Book) -> Book {
        let ratings: Vec<u8> = self
            .tables
            .reviews
            .iter()
            .filter(|r| r.book_id == book.id && r.approved)
            .map(|r| r.rating)
            .collect();
        book.apply_metrics(&ratings);
        book
    }

    fn all_books(&self) -> Vec<Book> {
        let mut books: Vec<Book> = self
            .tables
            .books
            .iter()
            .map(|kv| kv.value().clone())
            .collect();
        books.sort_by_key(|b| b.id);
        books.into_iter().map(|b| self.with_metrics(b)).collect()
    }

    fn hydrate(&self, stored: StoredCart) -> Result<Cart, RepoError> {
        let items = stored
            .lines
            .iter()
            .filter_map(|(book_id, quantity)| {
                self.tables.books.get(book_id).map(|b| CartItem {
                    book_id: *book_id,
                    title: b.title.clone(),
                    unit_price_cents: b.price_cents,
                    quantity: *quantity,
                })
            })
            .collect();
        let mut cart = Cart {
            id: stored.id,
            user_id: stored.user_id,
            name: stored.name,
            is_default: stored.is_default,
            items,
            total_cents: 0,
        };
        cart.recalculate_total()
            .map_err(|e| RepoError::Rejected(e.to_string()))?;
        Ok(cart)
    }

    fn name_taken(&self, user_id: i64, name: &str) -> bool {
        self.tables
            .carts
            .iter()
            .any(|c| c.user_id == user_id && c.name == name)
    }

    fn insert_cart(&self, user_id: i64, name: &str, is_default: bool) -> StoredCart {
        let stored = StoredCart {
            id: self.tables.cart_seq.next(),
            user_id,
            name: name.to_string(),
            is_default,
            lines: Vec::new(),
        };
        self.tables.carts.insert(stored.id, stored.clone());
        stored
    }
}

#[async_trait]
impl UserRepository for InMemoryRepo {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let _guard = self.lock()?;
        if self
            .tables
            .users
            .iter()
            .any(|u| u.username == user.username)
        {
            return Err(RepoError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }
        let created = User {
            id: self.tables.user_seq.next(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        };
        self.tables.users.insert(created.id, created.clone());
        self.insert_cart(created.id, DEFAULT_CART_NAME, true);
        Ok(created)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.tables.users.get(&id).map(|r| r.clone()))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .tables
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.value().clone()))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self
            .tables
            .users
            .iter()
            .map(|kv| kv.value().clone())
            .collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<Option<User>, RepoError> {
        let _guard = self.lock()?;
        if self
            .tables
            .users
            .iter()
            .any(|u| u.id != id && u.username == update.username)
        {
            return Err(RepoError::Conflict(format!(
                "username {} already exists",
                update.username
            )));
        }
        if let Some(mut v) = self.tables.users.get_mut(&id) {
            v.username = update.username;
            v.email = update.email;
            if let Some(hash) = update.password_hash {
                v.password_hash = hash;
            }
            return Ok(Some(v.clone()));
        }
        Ok(None)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, RepoError> {
        let _guard = self.lock()?;
        if self.tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        self.tables.carts.retain(|_, c| c.user_id != id);
        self.tables.orders.retain(|_, o| o.user_id != id);
        self.tables.reviews.retain(|_, r| r.user_id != id);
        for mut book in self.tables.books.iter_mut() {
            if book.owner_id == Some(id) {
                book.owner_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl BookRepository for InMemoryRepo {
    async fn create_book(&self, book: NewBook) -> Result<Book, RepoError> {
        let created = book.into_book(self.tables.book_seq.next());
        self.tables.books.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>, RepoError> {
        let book = self.tables.books.get(&id).map(|r| r.clone());
        Ok(book.map(|b| self.with_metrics(b)))
    }

    async fn list_books(&self, sort: BookSort) -> Result<Vec<Book>, RepoError> {
        let mut books = self.all_books();
        sort.sort(&mut books);
        Ok(books)
    }

    async fn search_books(&self, filter: BookFilter) -> Result<Vec<Book>, RepoError> {
        Ok(self
            .all_books()
            .into_iter()
            .filter(|b| filter.matches(b))
            .collect())
    }

    async fn page_books(&self, page: u32, size: u32) -> Result<(Vec<Book>, u64), RepoError> {
        let books = self.all_books();
        let total = books.len() as u64;
        let start = (page as usize).saturating_mul(size as usize);
        Ok((
            books.into_iter().skip(start).take(size as usize).collect(),
            total,
        ))
    }

    async fn delete_book(&self, id: i64) -> Result<bool, RepoError> {
        let _guard = self.lock()?;
        if self.tables.books.remove(&id).is_none() {
            return Ok(false);
        }
        self.tables.reviews.retain(|_, r| r.book_id != id);
        for mut cart in self.tables.carts.iter_mut() {
            cart.lines.retain(|(book_id, _)| *book_id != id);
        }
        Ok(true)
    }
}

#[async_trait]
impl CartRepository for InMemoryRepo {
    async fn create_cart(
        &self,
        user_id: i64,
        name: &str,
        is_default: bool,
    ) -> Result<Cart, RepoError> {
        let _guard = self.lock()?;
        if self.name_taken(user_id, name) {
            return Err(RepoError::Conflict(format!("cart {name} already exists")));
        }
        self.hydrate(self.insert_cart(user_id, name, is_default))
    }

    async fn get_cart(&self, id: i64) -> Result<Option<Cart>, RepoError> {
        let stored = self.tables.carts.get(&id).map(|r| r.clone());
        stored.map(|c| self.hydrate(c)).transpose()
    }

    async fn default_cart(&self, user_id: i64) -> Result<Option<Cart>, RepoError> {
        let stored = self
            .tables
            .carts
            .iter()
            .find(|c| c.user_id == user_id && c.is_default)
            .map(|c| c.value().clone());
        stored.map(|c| self.hydrate(c)).transpose()
    }

    async fn list_carts(&self, user_id: i64) -> Result<Vec<Cart>, RepoError> {
        let mut stored: Vec<StoredCart> = self
            .tables
            .carts
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.value().clone())
            .collect();
        stored.sort_by_key(|c| c.id);
        stored.into_iter().map(|c| self.hydrate(c)).collect()
    }

    async fn save_cart_items(
        &self,
        cart_id: i64,
        items: &[CartItem],
    ) -> Result<Option<Cart>, RepoError> {
        let _guard = self.lock()?;
        let updated = match self.tables.carts.get_mut(&cart_id) {
            Some(mut c) => {
                c.lines = items.iter().map(|i| (i.book_id, i.quantity)).collect();
                c.clone()
            }
            None => return Ok(None),
        };
        Ok(Some(self.hydrate(updated)?))
    }

    async fn delete_cart(&self, id: i64) -> Result<bool, RepoError> {
        let _guard = self.lock()?;
        Ok(self.tables.carts.remove(&id).is_some())
    }
}

#[async_trait]
impl OrderRepository for InMemoryRepo {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepoError> {
        let created = order.into_order(self.tables.order_seq.next());
        self.tables.orders.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError> {
        Ok(self.tables.orders.get(&id).map(|r| r.clone()))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        let mut orders: Vec<Order> = self
            .tables
            .orders
            .iter()
            .map(|kv| kv.value().clone())
            .collect();
        orders.sort_by_key(|o| o.id);
        Ok(orders)
    }

    async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, RepoError> {
        let mut orders = self.list_orders().await?;
        orders.retain(|o| o.user_id == user_id);
        Ok(orders)
    }

    async fn update_order(
        &self,
        id: i64,
        total_cents: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        if let Some(mut v) = self.tables.orders.get_mut(&id) {
            v.total_cents = total_cents;
            v.status = status;
            return Ok(Some(v.clone()));
        }
        Ok(None)
    }

    async fn delete_order(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.tables.orders.remove(&id).is_some())
    }

    async fn checkout(&self, cart_id: i64, user_id: i64) -> Result<Order, RepoError> {
        let _guard = self.lock()?;
        let stored = self
            .tables
            .carts
            .get(&cart_id)
            .map(|c| c.clone())
            .ok_or_else(|| RepoError::DbError(format!("cart {cart_id} vanished")))?;
        let cart = self.hydrate(stored)?;
        let order = NewOrder::from_cart_items(user_id, &cart.items)
            .map_err(|e| RepoError::Rejected(e.to_string()))?;
        if let Some(mut c) = self.tables.carts.get_mut(&cart_id) {
            c.lines.clear();
        }
        let created = order.into_order(self.tables.order_seq.next());
        self.tables.orders.insert(created.id, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl ReviewRepository for InMemoryRepo {
    async fn create_review(&self, review: NewReview) -> Result<Review, RepoError> {
        let created = review.into_review(self.tables.review_seq.next());
        self.tables.reviews.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_review(&self, id: i64) -> Result<Option<Review>, RepoError> {
        Ok(self.tables.reviews.get(&id).map(|r| r.clone()))
    }

    async fn reviews_for_book(&self, book_id: i64) -> Result<Vec<Review>, RepoError> {
        let mut reviews: Vec<Review> = self
            .tables
            .reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .map(|r| r.value().clone())
            .collect();
        reviews.sort_by_key(|r| r.id);
        Ok(reviews)
    }

    async fn approve_review(&self, id: i64) -> Result<Option<Review>, RepoError> {
        if let Some(mut v) = self.tables.reviews.get_mut(&id) {
            v.approved = true;
            return Ok(Some(v.clone()));
        }
        Ok(None)
    }

    async fn delete_review(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.tables.reviews.remove(&id).is_some())
    }
}
