use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthError, TokenBlacklist};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Username of the token holder.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// HS512 token issuer/verifier with an in-process revocation list.
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime_secs: i64,
    blacklist: TokenBlacklist,
}

impl JwtAuth {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime_secs,
            blacklist: TokenBlacklist::new(),
        }
    }

    pub fn issue(&self, username: &str) -> Result<IssuedToken, AuthError> {
        let now = Utc::now().timestamp();
        let exp = now
            .checked_add(self.lifetime_secs)
            .ok_or_else(|| AuthError::InvalidToken("token lifetime out of range".into()))?;
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS512), &claims, &self.encoding)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(IssuedToken {
            token,
            token_type: "Bearer".into(),
            expires_in: self.lifetime_secs,
        })
    }

    /// Checks signature, expiry and revocation.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if self.blacklist.is_revoked(&data.claims.jti) {
            return Err(AuthError::Revoked);
        }
        Ok(data.claims)
    }

    pub fn revoke(&self, claims: &Claims) {
        self.blacklist.revoke(&claims.jti, claims.exp);
    }
}
