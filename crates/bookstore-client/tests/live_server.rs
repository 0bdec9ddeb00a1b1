use std::sync::Arc;
use std::time::Duration;

use bookstore_client::{BookstoreClient, CreateBookRequest, RegisterRequest};
use bookstore_hex::auth::JwtAuth;
use bookstore_hex::inbound::http::{AppState, HttpServer, HttpServerConfig};
use bookstore_hex::notify::LogMailer;
use bookstore_repo::build_repo;
use bookstore_types::domain::order::OrderStatus;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

async fn spawn_server() -> (String, Arc<LogMailer>, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let repo = build_repo(None).await.unwrap();
    let mailer = Arc::new(LogMailer::new());
    let jwt = Arc::new(JwtAuth::new("client-live-test-secret-client-live-test", 600));
    let state = AppState::new(repo, jwt, mailer.clone());
    let server = HttpServer::new(
        state,
        HttpServerConfig {
            port: port.to_string(),
        },
    )
    .await
    .unwrap();
    let handle = tokio::spawn(async move {
        server.run().await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    (format!("http://127.0.0.1:{port}/"), mailer, handle)
}

#[tokio::test]
async fn shopping_round_trip_against_real_server() {
    let (base, mailer, handle) = spawn_server().await;

    let anonymous = BookstoreClient::builder(&base)
        .unwrap()
        .with_timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let user = anonymous
        .register(RegisterRequest {
            username: "reader".into(),
            email: "reader@example.com".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();
    let issued = anonymous.login("reader", "pw").await.unwrap();
    assert_eq!(issued.token_type, "Bearer");

    // protected routes reject the anonymous client
    assert!(anonymous.list_books().await.is_err());

    let client = anonymous.with_token(issued.token);
    let book = client
        .create_book(CreateBookRequest {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            description: String::new(),
            price_cents: 1500,
            genres: vec!["scifi".into()],
        })
        .await
        .unwrap();
    assert_eq!(client.get_book(book.id).await.unwrap().title, "Dune");

    let cart = client.add_to_cart(user.id, book.id, 3).await.unwrap();
    assert_eq!(cart.total_cents, 4500);
    let cart = client.remove_from_cart(user.id, book.id, 1).await.unwrap();
    assert_eq!(cart.total_cents, 3000);
    assert!(client.add_to_cart(user.id, book.id, 9).await.is_err());

    let order = client.checkout(user.id).await.unwrap();
    assert_eq!(order.total_cents, 3000);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(client.cart(user.id).await.unwrap().items.is_empty());
    assert_eq!(client.user_orders(user.id).await.unwrap().len(), 1);
    assert_eq!(mailer.sent().len(), 1);

    let shipped = client
        .update_order(order.id, order.total_cents, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(client.get_order(shipped.id).await.unwrap().status, OrderStatus::Shipped);

    let review = client.add_review(book.id, 5, "great").await.unwrap();
    assert!(!review.approved);
    let approved = client.approve_review(book.id, review.id).await.unwrap();
    assert!(approved.approved);
    assert_eq!(client.reviews(book.id).await.unwrap().total_elements, 1);
    assert_eq!(client.get_book(book.id).await.unwrap().number_of_reviews, 1);

    client.logout().await.unwrap();
    assert!(client.get_user(user.id).await.is_err());

    handle.abort();
}
