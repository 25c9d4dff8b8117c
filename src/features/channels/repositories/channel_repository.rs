use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::channels::models::Channel;

/// Channel persistence
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    async fn find_by_token(&self, token: &str) -> Result<Option<Channel>>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Channel>>;
    async fn list(&self) -> Result<Vec<Channel>>;
}

pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CHANNEL_COLUMNS: &str = "id, code, token, default_language_code, created_at";

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<Channel>> {
        sqlx::query_as::<_, Channel>(&format!(
            "SELECT {} FROM channels WHERE token = $1",
            CHANNEL_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find channel by token: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Channel>> {
        sqlx::query_as::<_, Channel>(&format!(
            "SELECT {} FROM channels WHERE code = $1",
            CHANNEL_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find channel by code: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list(&self) -> Result<Vec<Channel>> {
        sqlx::query_as::<_, Channel>(&format!(
            "SELECT {} FROM channels ORDER BY code",
            CHANNEL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list channels: {:?}", e);
            AppError::Database(e)
        })
    }
}
