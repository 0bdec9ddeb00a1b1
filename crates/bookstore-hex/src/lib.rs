//! bookstore-hex: hexagonal bookstore API library (core + auth + notifications + inbound HTTP)

pub mod config;
pub mod errors;

pub mod application;
pub mod auth;
pub mod notify;

pub use bookstore_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
