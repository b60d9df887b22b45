//! Storage seams: user/wallet persistence and session records.
//!
//! Postgres backs [`UserRepository`] in production (see `db`), Redis backs
//! [`SessionStore`]. The in-memory variants serve local runs without either
//! service and the test suite.

pub mod memory;
pub mod redis_repo;

pub use memory::{InMemorySessionStore, InMemoryUserRepository};
pub use redis_repo::RedisSessionStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::AuthAppService;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, SessionData, User, Wallet};

/// Users and their wallets.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Fails with [`AppError::DuplicateUsername`] when the
    /// username is taken.
    async fn insert_user(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Return the user's wallet, creating it on first use.
    async fn get_or_create_wallet(&self, user_id: Uuid) -> AppResult<Wallet>;

    async fn find_wallet(&self, user_id: Uuid) -> AppResult<Option<Wallet>>;

    /// Insert a user together with their wallet; either both exist afterwards
    /// or neither does.
    async fn insert_account(&self, new_user: NewUser) -> AppResult<(User, Wallet)>;

    /// Hash `password` and insert the user.
    async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> AppResult<User> {
        let password_hash = AuthAppService::hash_password(password)?;
        self.insert_user(NewUser {
            username: username.to_string(),
            email: email.map(str::to_string),
            password_hash,
        })
        .await
    }

    /// Hash `password` and insert the user with their wallet.
    async fn create_account(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> AppResult<(User, Wallet)> {
        let password_hash = AuthAppService::hash_password(password)?;
        self.insert_account(NewUser {
            username: username.to_string(),
            email: email.map(str::to_string),
            password_hash,
        })
        .await
    }

    /// Check credentials. Unknown user and wrong password both yield
    /// [`AppError::InvalidCredentials`].
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        if !AuthAppService::verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }
        Ok(user)
    }
}

/// Session records keyed by the hashed session token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, key: &str) -> AppResult<Option<SessionData>>;

    /// Write the record, expiring it after `ttl_seconds`.
    async fn save(&self, key: &str, data: &SessionData, ttl_seconds: u64) -> AppResult<()>;

    /// Remove the record. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;
}
