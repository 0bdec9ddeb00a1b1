//! Bearer-token authentication: JWT issuing/verification, password hashing and token revocation.

pub mod blacklist;
pub mod jwt;
pub mod password;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::AppError;

pub use blacklist::TokenBlacklist;
pub use jwt::{Claims, IssuedToken, JwtAuth};

/// The caller of a protected route, resolved from a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl AuthUser {
    /// Rejects the call unless the caller is `user_id`.
    pub fn ensure_is(&self, user_id: i64) -> Result<(), AppError> {
        if self.id == user_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "user {} may not act on behalf of user {}",
                self.id, user_id
            )))
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token has been revoked")]
    Revoked,

    #[error("invalid username or password")]
    BadCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Hashing(m) => AppError::Internal(anyhow::anyhow!(m)),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_checks_identity() {
        let me = AuthUser {
            id: 7,
            username: "me".into(),
        };
        assert!(me.ensure_is(7).is_ok());
        assert!(matches!(me.ensure_is(8), Err(AppError::Forbidden(_))));
    }
}
