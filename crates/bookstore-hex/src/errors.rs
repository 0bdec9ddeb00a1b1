use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bookstore_types::domain::cart::CartRuleError;
use bookstore_types::ports::RepoError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict(m) => AppError::Conflict(m),
            RepoError::Rejected(m) => AppError::BadRequest(m),
            RepoError::DbError(m) => AppError::Internal(anyhow::anyhow!(m)),
        }
    }
}

impl From<CartRuleError> for AppError {
    fn from(e: CartRuleError) -> Self {
        match e {
            CartRuleError::NotInCart => AppError::NotFound(e.to_string()),
            _ => AppError::BadRequest(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, msg) = match &self {
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
        };

        let body = serde_json::to_string(&ErrorBody { error: msg })
            .unwrap_or_else(|_| "{\"error\":\"internal serialization\"}".into());
        (code, [("content-type", "application/json")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_and_cart_errors_map_to_statuses() {
        let conflict: AppError = RepoError::Conflict("dup".into()).into();
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let db: AppError = RepoError::DbError("boom".into()).into();
        assert_eq!(db.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let missing: AppError = CartRuleError::NotInCart.into();
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let limit: AppError = CartRuleError::LimitExceeded.into();
        assert_eq!(limit.into_response().status(), StatusCode::BAD_REQUEST);

        let overflow: AppError = CartRuleError::TotalOverflow.into();
        assert_eq!(overflow.into_response().status(), StatusCode::BAD_REQUEST);

        let rejected: AppError = RepoError::Rejected("Cart is empty".into()).into();
        assert_eq!(rejected.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
