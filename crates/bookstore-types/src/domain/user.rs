use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// Validated registration data. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
}

pub fn validate_profile(username: &str, email: &str) -> anyhow::Result<()> {
    if username.trim().is_empty() {
        anyhow::bail!("username must not be empty");
    }
    if !email.contains('@') {
        anyhow::bail!("invalid email");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "testuser".into(),
            email: "testuser@example.com".into(),
            password_hash: "$argon2id$secret".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "testuser");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn profile_validation() {
        assert!(validate_profile("alice", "a@b.com").is_ok());
        assert!(validate_profile("  ", "a@b.com").is_err());
        assert!(validate_profile("alice", "invalid").is_err());
    }
}
