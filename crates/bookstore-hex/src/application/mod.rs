pub mod book_service;
pub mod cart_service;
pub mod order_service;
pub mod review_service;
pub mod user_service;

pub use book_service::BookService;
pub use cart_service::{CartService, CartTarget};
pub use order_service::OrderService;
pub use review_service::ReviewService;
pub use user_service::UserService;
