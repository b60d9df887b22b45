//! Per-user wallet record.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One wallet per user. Carries nothing beyond its owner link.
#[derive(Debug, Clone, FromRow)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
