use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for channel
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Channel {
    pub id: Uuid,
    pub code: String,
    pub token: String,
    pub default_language_code: String,
    pub created_at: DateTime<Utc>,
}
