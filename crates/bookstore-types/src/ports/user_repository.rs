use async_trait::async_trait;

use super::RepoError;
use crate::domain::user::{NewUser, User, UserUpdate};

#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Stores the user together with their default cart. Duplicate usernames are a `Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
    async fn list_users(&self) -> Result<Vec<User>, RepoError>;
    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<Option<User>, RepoError>;
    /// Removes the user with their carts, orders and reviews; their books lose the owner.
    async fn delete_user(&self, id: i64) -> Result<bool, RepoError>;
}
