use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for asset
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    pub source: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

/// Values for a new asset row
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub name: String,
    pub source: String,
    pub mime_type: String,
}
