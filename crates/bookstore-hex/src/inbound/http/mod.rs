mod books;
mod carts;
mod middleware;
mod orders;
mod reviews;
mod server;
mod users;

pub use middleware::require_auth;
pub use server::{AppState, HttpServer, HttpServerConfig};
