//! Outbound email: the `Mailer` port, its adapters and the order confirmation template.

pub mod log_mailer;
pub mod smtp;

use async_trait::async_trait;
use bookstore_types::domain::order::Order;
use bookstore_types::domain::user::User;
use std::fmt::Write;
use thiserror::Error;

pub use log_mailer::LogMailer;
pub use smtp::SmtpMailer;

pub const ORDER_CONFIRMATION_SUBJECT: &str = "Your Order Confirmation - Dynamic Online Book Store";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("could not build message: {0}")]
    Build(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

fn dollars(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

pub fn compose_order_confirmation(user: &User, order: &Order) -> EmailMessage {
    let mut body = String::new();
    // Writing to a String cannot fail.
    let _ = write!(body, "Dear {},\n\n", user.username);
    body.push_str(
        "Thank you for ordering with Dynamic Online Book Store! \
         We're excited to confirm your purchase.\n\n",
    );
    body.push_str("Order Details:\n");
    let _ = writeln!(body, "Order ID: {}", order.id);
    body.push_str("Items Ordered:\n");
    for item in &order.items {
        let _ = writeln!(
            body,
            "- {} (Qty: {}, Price: ${})",
            item.title,
            item.quantity,
            dollars(item.price_cents)
        );
    }
    let _ = write!(body, "Total Amount: ${}\n\n", dollars(order.total_cents));
    body.push_str("Payment Details:\n");
    body.push_str("Payment Method: Paid via Credit Card\n");
    let _ = write!(body, "Amount Paid: ${}\n\n", dollars(order.total_cents));
    body.push_str("About Us:\n");
    body.push_str(
        "Dynamic Online Book Store - Your trusted source for books since 2025. \
         We offer a wide range of books to cater to all your reading needs.\n\n",
    );
    body.push_str("We'll notify you once your order is shipped.\n\n");
    body.push_str("Best regards,\nDynamic Book Store Team");

    EmailMessage {
        to: user.email.clone(),
        subject: ORDER_CONFIRMATION_SUBJECT.to_string(),
        body,
    }
}
