use std::sync::Arc;

use bookstore_hex::application::CartTarget;
use bookstore_hex::auth::{AuthUser, JwtAuth};
use bookstore_hex::inbound::http::AppState;
use bookstore_hex::notify::LogMailer;
use bookstore_repo::memory::InMemoryRepo;
use bookstore_types::domain::order::OrderStatus;
use bookstore_types::domain::review::ReviewSort;

const SECRET: &str = "service-flow-secret-service-flow-secret";

// End-to-end service flow against the in-memory adapter.
#[tokio::test]
async fn register_shop_checkout_review_flow() {
    let mailer = Arc::new(LogMailer::new());
    let state = AppState::new(
        InMemoryRepo::new(),
        Arc::new(JwtAuth::new(SECRET, 600)),
        mailer.clone(),
    );

    let seller = state
        .users
        .register("seller".into(), "seller@example.com".into(), "pw".into())
        .await
        .unwrap();
    let buyer = state
        .users
        .register("buyer".into(), "buyer@example.com".into(), "pw".into())
        .await
        .unwrap();
    let token = state.users.login("buyer", "pw").await.unwrap();
    let (me, _) = state.users.authenticate(&token.token).await.unwrap();
    assert_eq!(me.id, buyer.id);

    let as_seller = AuthUser {
        id: seller.id,
        username: seller.username.clone(),
    };
    let book = state
        .books
        .create_book(
            &as_seller,
            "The Hobbit".into(),
            "J.R.R. Tolkien".into(),
            "There and back again".into(),
            1299,
            vec!["Fantasy".into()],
        )
        .await
        .unwrap();

    state
        .carts
        .add_item(me.id, CartTarget::Default, book.id, 3)
        .await
        .unwrap();
    let order = state
        .carts
        .checkout(me.id, CartTarget::Default)
        .await
        .unwrap();
    assert_eq!(order.total_cents, 3 * 1299);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(mailer.sent().len(), 1);

    let mine = state.orders.orders_for_user(me.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    let shipped = state
        .orders
        .update_order(order.id, order.total_cents, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    let review = state
        .reviews
        .add_review(&me, book.id, 5, "Loved it".into())
        .await
        .unwrap();
    assert_eq!(state.books.get_book(book.id).await.unwrap().number_of_reviews, 0);

    state
        .reviews
        .approve_review(&as_seller, book.id, review.id)
        .await
        .unwrap();
    let rated = state.books.get_book(book.id).await.unwrap();
    assert_eq!(rated.number_of_reviews, 1);
    assert_eq!(rated.average_rating, 5.0);

    let page = state
        .reviews
        .list_reviews(&me, book.id, 0, 10, ReviewSort::NewestFirst)
        .await
        .unwrap();
    assert_eq!(page.total_elements, 1);
}
