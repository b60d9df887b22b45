//! Postgres repository: users and wallets.

use async_trait::async_trait;
use uuid::Uuid;

use super::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, Wallet};
use crate::repositories::UserRepository;

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn user_insert_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::DuplicateUsername
    } else {
        AppError::Db(err)
    }
}

fn insert_user_sql() -> String {
    format!(
        r#"
        INSERT INTO users (username, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING {USER_COLUMNS}
        "#
    )
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert_user(&self, new_user: NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(&insert_user_sql())
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(user_insert_error)?;
        Ok(row)
    }

    async fn insert_account(&self, new_user: NewUser) -> AppResult<(User, Wallet)> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&insert_user_sql())
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .fetch_one(&mut *tx)
            .await
            .map_err(user_insert_error)?;

        let wallet = sqlx::query_as::<_, Wallet>(
            "INSERT INTO wallets (user_id) VALUES ($1) RETURNING id, user_id, created_at",
        )
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((user, wallet))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_or_create_wallet(&self, user_id: Uuid) -> AppResult<Wallet> {
        sqlx::query(
            r#"
            INSERT INTO wallets (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, Wallet>(
            "SELECT id, user_id, created_at FROM wallets WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_wallet(&self, user_id: Uuid) -> AppResult<Option<Wallet>> {
        let row = sqlx::query_as::<_, Wallet>(
            "SELECT id, user_id, created_at FROM wallets WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
