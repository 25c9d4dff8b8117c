use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core::error::Result;
use crate::features::assets::models::{Asset, NewAsset};
use crate::shared::id_codec::EntityIds;

/// Request DTO for registering an asset
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssetDto {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(url)]
    pub source: String,

    #[validate(length(min = 3, max = 100))]
    pub mime_type: String,
}

impl From<CreateAssetDto> for NewAsset {
    fn from(dto: CreateAssetDto) -> Self {
        Self {
            name: dto.name.trim().to_string(),
            source: dto.source,
            mime_type: dto.mime_type,
        }
    }
}

/// Response DTO for asset
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetResponseDto {
    pub id: String,
    pub name: String,
    pub source: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<Asset> for AssetResponseDto {
    fn from(a: Asset) -> Self {
        Self {
            id: a.id.to_string(),
            name: a.name,
            source: a.source,
            mime_type: a.mime_type,
            created_at: a.created_at,
        }
    }
}

impl EntityIds for AssetResponseDto {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()> {
        self.id.visit_ids(visit)
    }
}
