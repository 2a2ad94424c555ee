use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Server-side login session row backing the `user` cookie.
#[derive(Debug, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
