use axum::{middleware, routing::get, serve, Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::{books, carts, orders, reviews, users};
use crate::application::{BookService, CartService, OrderService, ReviewService, UserService};
use crate::auth::JwtAuth;
use crate::notify::Mailer;
use bookstore_types::ports::Store;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

/// Shared handler state: one instance of every application service.
pub struct AppState<R: Store> {
    pub users: Arc<UserService<R>>,
    pub books: Arc<BookService<R>>,
    pub carts: Arc<CartService<R>>,
    pub orders: Arc<OrderService<R>>,
    pub reviews: Arc<ReviewService<R>>,
}

impl<R: Store> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            books: self.books.clone(),
            carts: self.carts.clone(),
            orders: self.orders.clone(),
            reviews: self.reviews.clone(),
        }
    }
}

impl<R: Store> AppState<R> {
    pub fn new(repo: R, jwt: Arc<JwtAuth>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            users: Arc::new(UserService::new(repo.clone(), jwt)),
            books: Arc::new(BookService::new(repo.clone())),
            carts: Arc::new(CartService::new(repo.clone(), mailer)),
            orders: Arc::new(OrderService::new(repo.clone())),
            reviews: Arc::new(ReviewService::new(repo)),
        }
    }
}

#[derive(Clone)]
pub struct HttpServer<R: Store> {
    pub state: AppState<R>,
    pub config: HttpServerConfig,
}

impl<R: Store> HttpServer<R> {
    pub async fn new(state: AppState<R>, config: HttpServerConfig) -> anyhow::Result<Self> {
        Ok(Self { state, config })
    }

    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        let public = Router::new()
            .route("/health", get(health))
            .merge(users::public_routes::<R>());

        let protected = Router::new()
            .merge(users::routes::<R>())
            .merge(books::routes::<R>())
            .merge(carts::routes::<R>())
            .merge(orders::routes::<R>())
            .merge(reviews::routes::<R>())
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                super::require_auth::<R>,
            ));

        public
            .merge(protected)
            .layer(trace_layer)
            .with_state(self.state.clone())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = self.router();
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}
