#![cfg(feature = "memory")]

use bookstore_repo::memory::InMemoryRepo;
use bookstore_types::domain::book::{BookSort, NewBook};
use bookstore_types::domain::cart::CartItem;
use bookstore_types::domain::order::{NewOrder, OrderStatus};
use bookstore_types::domain::review::NewReview;
use bookstore_types::domain::user::{NewUser, UserUpdate};
use bookstore_types::ports::{
    BookFilter, BookRepository, CartRepository, OrderRepository, RepoError, ReviewRepository,
    UserRepository,
};

fn new_user(name: &str) -> NewUser {
    NewUser {
        username: name.into(),
        email: format!("{name}@example.com"),
        password_hash: "hash".into(),
    }
}

fn new_book(title: &str, author: &str, price_cents: i64, owner: i64) -> NewBook {
    NewBook::new(
        title.into(),
        author.into(),
        String::new(),
        price_cents,
        vec!["Fiction".into()],
        Some(owner),
    )
    .unwrap()
}

#[tokio::test]
async fn users_get_a_default_cart_and_unique_names() {
    let repo = InMemoryRepo::new();
    let alice = repo.create_user(new_user("alice")).await.unwrap();

    let cart = repo.default_cart(alice.id).await.unwrap().unwrap();
    assert!(cart.is_default);
    assert!(cart.items.is_empty());

    let dup = repo.create_user(new_user("alice")).await;
    assert!(matches!(dup, Err(RepoError::Conflict(_))));

    let updated = repo
        .update_user(
            alice.id,
            UserUpdate {
                username: "alice2".into(),
                email: "a2@example.com".into(),
                password_hash: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.password_hash, "hash");
    assert!(repo.find_user_by_username("alice2").await.unwrap().is_some());
}

#[tokio::test]
async fn books_search_sort_and_page() {
    let repo = InMemoryRepo::new();
    let owner = repo.create_user(new_user("owner")).await.unwrap();
    repo.create_book(new_book("Dune", "Herbert", 1500, owner.id)).await.unwrap();
    repo.create_book(new_book("Emma", "Austen", 900, owner.id)).await.unwrap();
    repo.create_book(new_book("Dracula", "Stoker", 1200, owner.id)).await.unwrap();

    let by_price = repo.list_books(BookSort::Price).await.unwrap();
    assert_eq!(by_price[0].title, "Emma");

    let hits = repo
        .search_books(BookFilter::TitleContains("dU".into()))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let cheap = repo
        .search_books(BookFilter::PriceBetween {
            min_cents: 900,
            max_cents: 1200,
        })
        .await
        .unwrap();
    assert_eq!(cheap.len(), 2);

    let (page, total) = repo.page_books(1, 2).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].title, "Dracula");
}

#[tokio::test]
async fn metrics_count_only_approved_reviews() {
    let repo = InMemoryRepo::new();
    let user = repo.create_user(new_user("reader")).await.unwrap();
    let book = repo.create_book(new_book("Dune", "Herbert", 1500, user.id)).await.unwrap();

    let first = repo
        .create_review(NewReview::new(book.id, user.id, 4, "good".into()).unwrap())
        .await
        .unwrap();
    repo.create_review(NewReview::new(book.id, user.id, 1, "meh".into()).unwrap())
        .await
        .unwrap();
    assert_eq!(repo.get_book(book.id).await.unwrap().unwrap().number_of_reviews, 0);

    repo.approve_review(first.id).await.unwrap().unwrap();
    let book = repo.get_book(book.id).await.unwrap().unwrap();
    assert_eq!(book.number_of_reviews, 1);
    assert_eq!(book.average_rating, 4.0);
}

#[tokio::test]
async fn checkout_stores_order_and_empties_cart() {
    let repo = InMemoryRepo::new();
    let user = repo.create_user(new_user("buyer")).await.unwrap();
    let book = repo.create_book(new_book("Dune", "Herbert", 1500, user.id)).await.unwrap();
    let cart = repo.default_cart(user.id).await.unwrap().unwrap();

    let items = vec![CartItem {
        book_id: book.id,
        title: book.title.clone(),
        unit_price_cents: book.price_cents,
        quantity: 2,
    }];
    let saved = repo.save_cart_items(cart.id, &items).await.unwrap().unwrap();
    assert_eq!(saved.total_cents, 3000);

    let order = repo.checkout(cart.id, user.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_cents, 3000);
    assert!(repo.get_cart(cart.id).await.unwrap().unwrap().items.is_empty());
    assert_eq!(repo.list_orders_for_user(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn checkout_copies_lines_saved_after_the_cart_was_read() {
    let repo = InMemoryRepo::new();
    let user = repo.create_user(new_user("racer")).await.unwrap();
    let dune = repo.create_book(new_book("Dune", "Herbert", 1500, user.id)).await.unwrap();
    let emma = repo.create_book(new_book("Emma", "Austen", 900, user.id)).await.unwrap();
    let cart = repo.default_cart(user.id).await.unwrap().unwrap();

    assert!(matches!(
        repo.checkout(cart.id, user.id).await,
        Err(RepoError::Rejected(_))
    ));

    let line = |book_id: i64, title: &str, price: i64, quantity: u32| CartItem {
        book_id,
        title: title.into(),
        unit_price_cents: price,
        quantity,
    };
    let seen = repo
        .save_cart_items(cart.id, &[line(dune.id, "Dune", 1500, 2)])
        .await
        .unwrap()
        .unwrap();
    // another request adds a line before checkout runs
    repo.save_cart_items(
        cart.id,
        &[line(dune.id, "Dune", 1500, 2), line(emma.id, "Emma", 900, 1)],
    )
    .await
    .unwrap();

    let order = repo.checkout(seen.id, user.id).await.unwrap();
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total_cents, 3900);
    assert!(repo.get_cart(cart.id).await.unwrap().unwrap().items.is_empty());
}

#[tokio::test]
async fn deleting_a_book_cascades_but_orders_keep_their_lines() {
    let repo = InMemoryRepo::new();
    let user = repo.create_user(new_user("collector")).await.unwrap();
    let dune = repo.create_book(new_book("Dune", "Herbert", 1500, user.id)).await.unwrap();
    let emma = repo.create_book(new_book("Emma", "Austen", 900, user.id)).await.unwrap();
    let cart = repo.default_cart(user.id).await.unwrap().unwrap();

    let dune_line = CartItem {
        book_id: dune.id,
        title: "Dune".into(),
        unit_price_cents: 1500,
        quantity: 1,
    };
    let emma_line = CartItem {
        book_id: emma.id,
        title: "Emma".into(),
        unit_price_cents: 900,
        quantity: 2,
    };
    repo.save_cart_items(cart.id, &[dune_line.clone()]).await.unwrap();
    let order = repo.checkout(cart.id, user.id).await.unwrap();
    repo.save_cart_items(cart.id, &[dune_line, emma_line]).await.unwrap();
    repo.create_review(NewReview::new(dune.id, user.id, 5, "classic".into()).unwrap())
        .await
        .unwrap();

    assert!(repo.delete_book(dune.id).await.unwrap());

    let cart = repo.get_cart(cart.id).await.unwrap().unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].book_id, emma.id);
    assert_eq!(cart.total_cents, 1800);
    assert!(repo.reviews_for_book(dune.id).await.unwrap().is_empty());

    let kept = repo.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(kept.items.len(), 1);
    assert_eq!(kept.items[0].title, "Dune");
    assert_eq!(kept.total_cents, 1500);
}

#[tokio::test]
async fn deleting_a_user_cascades() {
    let repo = InMemoryRepo::new();
    let user = repo.create_user(new_user("gone")).await.unwrap();
    let book = repo.create_book(new_book("Dune", "Herbert", 1500, user.id)).await.unwrap();
    repo.create_order(NewOrder::new(user.id, 100, OrderStatus::Pending, vec![]).unwrap())
        .await
        .unwrap();

    assert!(repo.delete_user(user.id).await.unwrap());
    assert!(repo.list_carts(user.id).await.unwrap().is_empty());
    assert!(repo.list_orders_for_user(user.id).await.unwrap().is_empty());
    assert_eq!(repo.get_book(book.id).await.unwrap().unwrap().owner_id, None);
    assert!(!repo.delete_user(user.id).await.unwrap());
}

#[tokio::test]
async fn missing_rows_are_none_or_false() {
    let repo = InMemoryRepo::new();
    assert!(repo.get_user(42).await.unwrap().is_none());
    assert!(repo.get_book(42).await.unwrap().is_none());
    assert!(repo.save_cart_items(42, &[]).await.unwrap().is_none());
    assert!(repo
        .update_order(42, 0, OrderStatus::Shipped)
        .await
        .unwrap()
        .is_none());
    assert!(repo.approve_review(42).await.unwrap().is_none());
    assert!(!repo.delete_book(42).await.unwrap());
    assert!(!repo.delete_review(42).await.unwrap());
}
