//! In-memory stores for local runs without Postgres/Redis and for tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SessionStore, UserRepository};
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, SessionData, User, Wallet};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    usernames: HashMap<String, Uuid>,
    wallets: HashMap<Uuid, Wallet>,
}

/// Users and wallets held in process memory.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn wallet_count(&self) -> usize {
        self.tables.read().await.wallets.len()
    }
}

impl Tables {
    fn insert_user(&mut self, new_user: NewUser) -> AppResult<User> {
        if self.usernames.contains_key(&new_user.username) {
            return Err(AppError::DuplicateUsername);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        self.usernames.insert(user.username.clone(), user.id);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert_user(&self, new_user: NewUser) -> AppResult<User> {
        self.tables.write().await.insert_user(new_user)
    }

    async fn insert_account(&self, new_user: NewUser) -> AppResult<(User, Wallet)> {
        let mut tables = self.tables.write().await;
        let user = tables.insert_user(new_user)?;
        let wallet = Wallet {
            id: Uuid::new_v4(),
            user_id: user.id,
            created_at: Utc::now(),
        };
        tables.wallets.insert(user.id, wallet.clone());
        Ok((user, wallet))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .usernames
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_or_create_wallet(&self, user_id: Uuid) -> AppResult<Wallet> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "wallet owner {} does not exist",
                user_id
            )));
        }
        let wallet = tables.wallets.entry(user_id).or_insert_with(|| Wallet {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
        });
        Ok(wallet.clone())
    }

    async fn find_wallet(&self, user_id: Uuid) -> AppResult<Option<Wallet>> {
        Ok(self.tables.read().await.wallets.get(&user_id).cloned())
    }
}

/// Session records held in process memory, expired lazily on read.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<String, (SessionData, Instant)>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, key: &str) -> AppResult<Option<SessionData>> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some((data, expires_at)) if *expires_at > now => Ok(Some(data.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, data: &SessionData, ttl_seconds: u64) -> AppResult<()> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_seconds);
        self.entries
            .write()
            .await
            .insert(key.to_string(), (data.clone(), expires_at));
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Flash;

    #[tokio::test]
    async fn create_user_rejects_duplicate_username() {
        let repo = InMemoryUserRepository::new();
        repo.create_user("alice", "pw1", None).await.unwrap();
        let err = repo.create_user("alice", "other", None).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create_user("alice", "pw1", Some("alice@example.com"))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "pw1");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));

        let found = repo.authenticate("alice", "pw1").await.unwrap();
        assert_eq!(found.id, user.id);
        assert!(matches!(
            repo.authenticate("alice", "wrong").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            repo.authenticate("bob", "pw1").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn wallet_is_created_once() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create_user("alice", "pw1", None).await.unwrap();
        assert!(repo.find_wallet(user.id).await.unwrap().is_none());

        let first = repo.get_or_create_wallet(user.id).await.unwrap();
        let second = repo.get_or_create_wallet(user.id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.user_id, user.id);
        assert_eq!(repo.wallet_count().await, 1);
    }

    #[tokio::test]
    async fn create_account_writes_user_and_wallet_together() {
        let repo = InMemoryUserRepository::new();
        let (user, wallet) = repo.create_account("alice", "pw1", None).await.unwrap();
        assert_eq!(wallet.user_id, user.id);
        assert_eq!(repo.find_wallet(user.id).await.unwrap().unwrap().id, wallet.id);

        let err = repo.create_account("alice", "pw2", None).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
        assert_eq!(repo.user_count().await, 1);
        assert_eq!(repo.wallet_count().await, 1);
    }

    #[tokio::test]
    async fn wallet_requires_existing_user() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.get_or_create_wallet(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn session_store_save_load_delete() {
        let store = InMemorySessionStore::new();
        let data = SessionData {
            user_id: Some(Uuid::new_v4()),
            flashes: vec![Flash::success("hi")],
        };
        store.save("k", &data, 60).await.unwrap();
        assert_eq!(store.load("k").await.unwrap(), Some(data));

        store.delete("k").await.unwrap();
        assert!(store.load("k").await.unwrap().is_none());
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn expired_sessions_are_not_loaded() {
        let store = InMemorySessionStore::new();
        store.save("k", &SessionData::default(), 0).await.unwrap();
        assert!(store.load("k").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
