use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::assets::models::{Asset, NewAsset};
use crate::features::assets::repositories::AssetRepository;

/// Asset store backed by a vector, for tests
#[derive(Default)]
pub struct MemoryAssetRepository {
    assets: Mutex<Vec<Asset>>,
}

#[async_trait]
impl AssetRepository for MemoryAssetRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Asset>> {
        let assets = self.assets.lock().unwrap();
        Ok(assets
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Asset>> {
        let assets = self.assets.lock().unwrap();
        Ok(assets.iter().find(|a| a.id == id).cloned())
    }

    async fn insert(&self, asset: NewAsset) -> Result<Asset> {
        let asset = Asset {
            id: Uuid::now_v7(),
            name: asset.name,
            source: asset.source,
            mime_type: asset.mime_type,
            created_at: Utc::now(),
        };
        self.assets.lock().unwrap().push(asset.clone());
        Ok(asset)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Asset>, i64)> {
        let assets = self.assets.lock().unwrap();
        let page = assets
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, assets.len() as i64))
    }
}
