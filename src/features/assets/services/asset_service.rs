use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::assets::models::{Asset, NewAsset};
use crate::features::assets::repositories::AssetRepository;

/// Service for asset operations
pub struct AssetService {
    repository: Arc<dyn AssetRepository>,
}

impl AssetService {
    pub fn new(repository: Arc<dyn AssetRepository>) -> Self {
        Self { repository }
    }

    /// Resolve asset ids in the given order.
    ///
    /// Every id must resolve; an unknown id fails the whole lookup.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Asset>> {
        let mut found: HashMap<Uuid, Asset> = self
            .repository
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut ordered = Vec::with_capacity(ids.len());
        for id in ids {
            // Duplicated ids are kept once, at their first position
            if ordered.iter().any(|a: &Asset| a.id == *id) {
                continue;
            }
            let asset = found
                .remove(id)
                .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))?;
            ordered.push(asset);
        }
        Ok(ordered)
    }

    pub async fn find_one(&self, id: Uuid) -> Result<Asset> {
        self.repository
            .find_one(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))
    }

    pub async fn create(&self, asset: NewAsset) -> Result<Asset> {
        let asset = self.repository.insert(asset).await?;
        tracing::info!(asset_id = %asset.id, "Asset created");
        Ok(asset)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Asset>, i64)> {
        self.repository.list(limit, offset).await
    }
}
