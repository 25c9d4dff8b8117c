use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::map_db_error;
use crate::core::error::{AppError, Result};
use crate::features::assets::models::{Asset, NewAsset};

/// Asset persistence
#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Asset>>;
    async fn find_one(&self, id: Uuid) -> Result<Option<Asset>>;
    async fn insert(&self, asset: NewAsset) -> Result<Asset>;
    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Asset>, i64)>;
}

pub struct PgAssetRepository {
    pool: PgPool,
}

impl PgAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetRepository for PgAssetRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Asset>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Asset>(
            r#"
            SELECT id, name, source, mime_type, created_at
            FROM assets
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load assets: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Asset>> {
        sqlx::query_as::<_, Asset>(
            r#"
            SELECT id, name, source, mime_type, created_at
            FROM assets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn insert(&self, asset: NewAsset) -> Result<Asset> {
        sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (id, name, source, mime_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, source, mime_type, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&asset.name)
        .bind(&asset.source)
        .bind(&asset.mime_type)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Asset>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let assets = sqlx::query_as::<_, Asset>(
            r#"
            SELECT id, name, source, mime_type, created_at
            FROM assets
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok((assets, total))
    }
}
