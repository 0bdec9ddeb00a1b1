use std::sync::Arc;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{AuthError, AuthUser, Claims, IssuedToken, JwtAuth};
use crate::errors::AppError;
use bookstore_types::domain::user::{validate_profile, NewUser, User, UserUpdate};
use bookstore_types::ports::Store;

pub struct UserService<R: Store> {
    repo: R,
    jwt: Arc<JwtAuth>,
}

impl<R: Store> UserService<R> {
    pub fn new(repo: R, jwt: Arc<JwtAuth>) -> Self {
        Self { repo, jwt }
    }

    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<User, AppError> {
        if password.is_empty() {
            return Err(AppError::BadRequest("password must not be empty".into()));
        }
        validate_profile(&username, &email).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let password_hash = hash_password(&password).await?;
        let user = self
            .repo
            .create_user(NewUser {
                username,
                email,
                password_hash,
            })
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AppError> {
        let user = self
            .repo
            .find_user_by_username(username)
            .await?
            .ok_or(AuthError::BadCredentials)?;
        if !verify_password(&user.password_hash, password).await? {
            tracing::debug!(username, "login rejected");
            return Err(AuthError::BadCredentials.into());
        }
        Ok(self.jwt.issue(&user.username)?)
    }

    pub fn logout(&self, claims: &Claims) {
        self.jwt.revoke(claims);
        tracing::info!(username = %claims.sub, "user logged out");
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn authenticate(&self, token: &str) -> Result<(AuthUser, Claims), AppError> {
        let claims = self.jwt.verify(token)?;
        let user = self
            .repo
            .find_user_by_username(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("user no longer exists".into()))?;
        Ok((
            AuthUser {
                id: user.id,
                username: user.username,
            },
            claims,
        ))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.repo.list_users().await?)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, AppError> {
        self.repo
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))
    }

    pub async fn update_user(
        &self,
        caller: &AuthUser,
        id: i64,
        username: String,
        email: String,
        password: Option<String>,
    ) -> Result<User, AppError> {
        caller.ensure_is(id)?;
        validate_profile(&username, &email).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let password_hash = match password.filter(|p| !p.is_empty()) {
            Some(p) => Some(hash_password(&p).await?),
            None => None,
        };
        self.repo
            .update_user(
                id,
                UserUpdate {
                    username,
                    email,
                    password_hash,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))
    }

    pub async fn delete_user(&self, caller: &AuthUser, id: i64) -> Result<(), AppError> {
        caller.ensure_is(id)?;
        if self.repo.delete_user(id).await? {
            tracing::info!(user_id = id, "user deleted");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("user {}", id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_repo::memory::InMemoryRepo;
    use bookstore_types::ports::CartRepository;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn service() -> (InMemoryRepo, UserService<InMemoryRepo>) {
        let repo = InMemoryRepo::new();
        let svc = UserService::new(repo.clone(), Arc::new(JwtAuth::new(SECRET, 600)));
        (repo, svc)
    }

    #[tokio::test]
    async fn register_login_authenticate_logout() {
        let (repo, svc) = service();
        let user = svc
            .register("alice".into(), "alice@example.com".into(), "pw".into())
            .await
            .unwrap();
        assert!(repo.default_cart(user.id).await.unwrap().is_some());

        let issued = svc.login("alice", "pw").await.unwrap();
        let (me, claims) = svc.authenticate(&issued.token).await.unwrap();
        assert_eq!(me.id, user.id);

        svc.logout(&claims);
        assert!(matches!(
            svc.authenticate(&issued.token).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn registration_validation_and_conflicts() {
        let (_, svc) = service();
        let empty = svc.register("a".into(), "a@x.io".into(), "".into()).await;
        assert!(matches!(empty, Err(AppError::BadRequest(_))));
        let bad_email = svc.register("a".into(), "nope".into(), "pw".into()).await;
        assert!(matches!(bad_email, Err(AppError::BadRequest(_))));

        svc.register("a".into(), "a@x.io".into(), "pw".into()).await.unwrap();
        let dup = svc.register("a".into(), "b@x.io".into(), "pw".into()).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_unauthorized() {
        let (_, svc) = service();
        svc.register("bob".into(), "bob@x.io".into(), "pw".into()).await.unwrap();
        assert!(matches!(svc.login("bob", "nope").await, Err(AppError::Unauthorized(_))));
        assert!(matches!(svc.login("ghost", "pw").await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn update_and_delete_are_self_only() {
        let (_, svc) = service();
        let alice = svc.register("alice".into(), "a@x.io".into(), "pw".into()).await.unwrap();
        let bob = svc.register("bob".into(), "b@x.io".into(), "pw".into()).await.unwrap();
        let as_bob = AuthUser {
            id: bob.id,
            username: bob.username.clone(),
        };
        let as_alice = AuthUser {
            id: alice.id,
            username: alice.username.clone(),
        };

        let denied = svc
            .update_user(&as_bob, alice.id, "x".into(), "x@x.io".into(), None)
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        svc.update_user(&as_alice, alice.id, "alice".into(), "new@x.io".into(), Some("pw2".into()))
            .await
            .unwrap();
        assert!(svc.login("alice", "pw2").await.is_ok());
        assert!(svc.login("alice", "pw").await.is_err());

        assert!(matches!(
            svc.delete_user(&as_bob, alice.id).await,
            Err(AppError::Forbidden(_))
        ));
        svc.delete_user(&as_alice, alice.id).await.unwrap();
        assert!(matches!(svc.get_user(alice.id).await, Err(AppError::NotFound(_))));
    }
}
