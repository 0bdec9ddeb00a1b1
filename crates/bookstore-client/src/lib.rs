use std::time::Duration;

use anyhow::Context;
use bookstore_types::domain::book::Book;
use bookstore_types::domain::cart::Cart;
use bookstore_types::domain::order::{Order, OrderStatus};
use bookstore_types::domain::page::Page;
use bookstore_types::domain::review::Review;
use bookstore_types::domain::user::User;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct BookstoreClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    token: Option<String>,
    client: Option<reqwest::Client>,
}

/// Typed client for the bookstore HTTP API. Protected calls need a token,
/// either from the builder or from [`BookstoreClient::with_token`].
#[derive(Clone)]
pub struct BookstoreClient {
    base: Url,
    client: reqwest::Client,
    token: Option<String>,
}

impl BookstoreClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<BookstoreClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(BookstoreClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            token: None,
            client: None,
        })
    }

    /// A copy of this client that sends `token` as its bearer credential.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            base: self.base.clone(),
            client: self.client.clone(),
            token: Some(token.into()),
        }
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base.join(path).context("failed to join url")
    }

    fn request(&self, method: Method, path: &str) -> anyhow::Result<RequestBuilder> {
        tracing::debug!(%method, path, "bookstore request");
        let req = self.client.request(method, self.url(path)?);
        Ok(match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        })
    }

    async fn send_json<T: serde::de::DeserializeOwned>(req: RequestBuilder) -> anyhow::Result<T> {
        let res = req.send().await?.error_for_status()?;
        Ok(res.json().await?)
    }

    async fn send_empty(req: RequestBuilder) -> anyhow::Result<()> {
        req.send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn register(&self, req: RegisterRequest) -> anyhow::Result<User> {
        Self::send_json(self.request(Method::POST, "api/users/register")?.json(&req)).await
    }

    pub async fn login(&self, username: &str, password: &str) -> anyhow::Result<TokenResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        Self::send_json(self.request(Method::POST, "api/users/login")?.json(&body)).await
    }

    pub async fn logout(&self) -> anyhow::Result<()> {
        Self::send_empty(self.request(Method::POST, "api/users/logout")?).await
    }

    pub async fn get_user(&self, id: i64) -> anyhow::Result<User> {
        Self::send_json(self.request(Method::GET, &format!("api/users/{id}"))?).await
    }

    pub async fn create_book(&self, req: CreateBookRequest) -> anyhow::Result<Book> {
        Self::send_json(self.request(Method::POST, "books")?.json(&req)).await
    }

    pub async fn get_book(&self, id: i64) -> anyhow::Result<Book> {
        Self::send_json(self.request(Method::GET, &format!("books/{id}"))?).await
    }

    pub async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        Self::send_json(self.request(Method::GET, "books")?).await
    }

    pub async fn books_page(&self, page: u32, size: u32) -> anyhow::Result<Page<Book>> {
        let req = self
            .request(Method::GET, "books/pagination")?
            .query(&[("page", page), ("size", size)]);
        Self::send_json(req).await
    }

    pub async fn delete_book(&self, id: i64) -> anyhow::Result<()> {
        Self::send_empty(self.request(Method::DELETE, &format!("books/{id}"))?).await
    }

    pub async fn cart(&self, user_id: i64) -> anyhow::Result<Cart> {
        Self::send_json(self.request(Method::GET, &format!("users/{user_id}/cart"))?).await
    }

    pub async fn add_to_cart(
        &self,
        user_id: i64,
        book_id: i64,
        quantity: i64,
    ) -> anyhow::Result<Cart> {
        let req = self
            .request(Method::POST, &format!("users/{user_id}/cart/add"))?
            .query(&[("bookId", book_id), ("quantity", quantity)]);
        Self::send_json(req).await
    }

    pub async fn remove_from_cart(
        &self,
        user_id: i64,
        book_id: i64,
        quantity: i64,
    ) -> anyhow::Result<Cart> {
        let req = self
            .request(Method::DELETE, &format!("users/{user_id}/cart/remove"))?
            .query(&[("bookId", book_id), ("quantity", quantity)]);
        Self::send_json(req).await
    }

    pub async fn checkout(&self, user_id: i64) -> anyhow::Result<Order> {
        Self::send_json(self.request(Method::POST, &format!("users/{user_id}/cart/checkout"))?)
            .await
    }

    pub async fn user_orders(&self, user_id: i64) -> anyhow::Result<Vec<Order>> {
        Self::send_json(self.request(Method::GET, &format!("users/{user_id}/orders"))?).await
    }

    pub async fn get_order(&self, id: i64) -> anyhow::Result<Order> {
        Self::send_json(self.request(Method::GET, &format!("orders/{id}"))?).await
    }

    pub async fn update_order(
        &self,
        id: i64,
        total_cents: i64,
        status: OrderStatus,
    ) -> anyhow::Result<Order> {
        let req = self
            .request(Method::PUT, &format!("orders/{id}"))?
            .json(&UpdateOrderRequest {
                total_cents,
                status,
            });
        Self::send_json(req).await
    }

    pub async fn add_review(
        &self,
        book_id: i64,
        rating: u8,
        comment: &str,
    ) -> anyhow::Result<Review> {
        let req = self
            .request(Method::POST, &format!("api/books/{book_id}/reviews"))?
            .query(&[("rating", rating.to_string().as_str()), ("comment", comment)]);
        Self::send_json(req).await
    }

    pub async fn reviews(&self, book_id: i64) -> anyhow::Result<Page<Review>> {
        Self::send_json(self.request(Method::GET, &format!("api/books/{book_id}/reviews"))?).await
    }

    pub async fn approve_review(&self, book_id: i64, review_id: i64) -> anyhow::Result<Review> {
        let path = format!("api/books/{book_id}/reviews/{review_id}/approve");
        Self::send_json(self.request(Method::PUT, &path)?).await
    }
}

impl BookstoreClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<BookstoreClient> {
        if let Some(client) = self.client {
            return Ok(BookstoreClient {
                base: self.base,
                client,
                token: self.token,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(BookstoreClient {
            base: self.base,
            client,
            token: self.token,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct UpdateOrderRequest {
    total_cents: i64,
    status: OrderStatus,
}
