pub mod book;
pub mod cart;
pub mod order;
pub mod page;
pub mod review;
pub mod user;
