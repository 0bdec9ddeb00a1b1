use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

/// Revoked token ids mapped to their expiry (unix seconds).
#[derive(Clone, Default)]
pub struct TokenBlacklist {
    entries: Arc<DashMap<String, i64>>,
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revokes `jti` until `expires_at`; entries already past their expiry are dropped first.
    pub fn revoke(&self, jti: &str, expires_at: i64) {
        let now = Utc::now().timestamp();
        self.entries.retain(|_, exp| *exp >= now);
        self.entries.insert(jti.to_string(), expires_at);
        tracing::debug!(jti, expires_at, "token revoked");
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.entries.contains_key(jti)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
