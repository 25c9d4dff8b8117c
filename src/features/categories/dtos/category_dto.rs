use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::assets::dtos::AssetResponseDto;
use crate::features::categories::models::{
    CategoryDetail, CategoryTreeNode, CreateCategoryInput, MoveCategoryInput, TranslatedCategory,
    TranslationInput, UpdateCategoryInput,
};
use crate::shared::id_codec::{parse_decoded_id, EntityIds};

/// Translation values for one language
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryTranslationInputDto {
    #[validate(regex(
        path = "*crate::shared::validation::LANGUAGE_CODE_REGEX",
        message = "Language code must look like 'en' or 'pt_BR'"
    ))]
    pub language_code: String,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(regex(
        path = "*crate::shared::validation::SLUG_REGEX",
        message = "Slug must be lowercase alphanumeric with single hyphens"
    ))]
    pub slug: String,

    #[serde(default)]
    pub description: String,
}

impl From<CategoryTranslationInputDto> for TranslationInput {
    fn from(dto: CategoryTranslationInputDto) -> Self {
        Self {
            language_code: dto.language_code,
            name: dto.name.trim().to_string(),
            slug: dto.slug,
            description: dto.description,
        }
    }
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    /// Parent category; the channel root when omitted
    pub parent_id: Option<String>,

    pub featured_asset_id: Option<String>,

    /// Ordered asset ids
    pub asset_ids: Option<Vec<String>>,

    #[validate(length(min = 1, message = "At least one translation is required"), nested)]
    pub translations: Vec<CategoryTranslationInputDto>,
}

impl EntityIds for CreateCategoryDto {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()> {
        self.parent_id.visit_ids(visit)?;
        self.featured_asset_id.visit_ids(visit)?;
        self.asset_ids.visit_ids(visit)
    }
}

impl TryFrom<CreateCategoryDto> for CreateCategoryInput {
    type Error = AppError;

    fn try_from(dto: CreateCategoryDto) -> Result<Self> {
        Ok(Self {
            parent_id: parse_optional_id(dto.parent_id.as_deref())?,
            featured_asset_id: parse_optional_id(dto.featured_asset_id.as_deref())?,
            asset_ids: parse_id_list(dto.asset_ids)?,
            translations: translations_from(dto.translations)?,
        })
    }
}

/// Request DTO for updating a category
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    pub featured_asset_id: Option<String>,

    /// Replaces the category's assets when present
    pub asset_ids: Option<Vec<String>>,

    /// Upserted by language code
    #[serde(default)]
    #[validate(nested)]
    pub translations: Vec<CategoryTranslationInputDto>,
}

impl EntityIds for UpdateCategoryDto {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()> {
        self.featured_asset_id.visit_ids(visit)?;
        self.asset_ids.visit_ids(visit)
    }
}

impl TryFrom<UpdateCategoryDto> for UpdateCategoryInput {
    type Error = AppError;

    fn try_from(dto: UpdateCategoryDto) -> Result<Self> {
        Ok(Self {
            featured_asset_id: parse_optional_id(dto.featured_asset_id.as_deref())?,
            asset_ids: parse_id_list(dto.asset_ids)?,
            translations: translations_from(dto.translations)?,
        })
    }
}

/// Request DTO for moving a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MoveCategoryDto {
    pub parent_id: String,

    /// Slot among the new siblings, clamped into range
    pub index: i64,
}

impl EntityIds for MoveCategoryDto {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()> {
        self.parent_id.visit_ids(visit)
    }
}

impl MoveCategoryDto {
    pub fn into_input(self, category_id: Uuid) -> Result<MoveCategoryInput> {
        Ok(MoveCategoryInput {
            category_id,
            parent_id: parse_decoded_id(&self.parent_id)?,
            index: self.index,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TreeQuery {
    /// Subtree root; the channel root when omitted
    pub root_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct NextPositionQuery {
    /// Parent category; the channel root when omitted
    pub parent_id: Option<String>,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: String,
    pub parent_id: Option<String>,
    pub position: i32,
    pub is_root: bool,
    pub language_code: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub featured_asset_id: Option<String>,
    pub asset_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TranslatedCategory> for CategoryResponseDto {
    fn from(c: TranslatedCategory) -> Self {
        Self {
            id: c.id.to_string(),
            parent_id: c.parent_id.map(|id| id.to_string()),
            position: c.position,
            is_root: c.is_root,
            language_code: c.language_code,
            name: c.name,
            slug: c.slug,
            description: c.description,
            featured_asset_id: c.featured_asset_id.map(|id| id.to_string()),
            asset_ids: c.asset_ids.iter().map(Uuid::to_string).collect(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl EntityIds for CategoryResponseDto {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()> {
        self.id.visit_ids(visit)?;
        self.parent_id.visit_ids(visit)?;
        self.featured_asset_id.visit_ids(visit)?;
        self.asset_ids.visit_ids(visit)
    }
}

/// Response DTO for a category with its assets resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDetailDto {
    #[serde(flatten)]
    pub category: CategoryResponseDto,
    pub featured_asset: Option<AssetResponseDto>,
    pub assets: Vec<AssetResponseDto>,
}

impl From<CategoryDetail> for CategoryDetailDto {
    fn from(d: CategoryDetail) -> Self {
        Self {
            category: d.category.into(),
            featured_asset: d.featured_asset.map(Into::into),
            assets: d.assets.into_iter().map(Into::into).collect(),
        }
    }
}

impl EntityIds for CategoryDetailDto {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()> {
        self.category.visit_ids(visit)?;
        self.featured_asset.visit_ids(visit)?;
        self.assets.visit_ids(visit)
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: String,
    pub parent_id: Option<String>,
    pub position: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub children: Vec<CategoryTreeDto>,
}

impl From<CategoryTreeNode> for CategoryTreeDto {
    fn from(node: CategoryTreeNode) -> Self {
        let c = node.category;
        Self {
            id: c.id.to_string(),
            parent_id: c.parent_id.map(|id| id.to_string()),
            position: c.position,
            name: c.name,
            slug: c.slug,
            description: c.description,
            children: node.children.into_iter().map(Into::into).collect(),
        }
    }
}

impl EntityIds for CategoryTreeDto {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()> {
        self.id.visit_ids(visit)?;
        self.parent_id.visit_ids(visit)?;
        self.children.visit_ids(visit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NextPositionDto {
    pub parent_id: Option<String>,
    pub position: i32,
}

fn parse_optional_id(raw: Option<&str>) -> Result<Option<Uuid>> {
    raw.map(parse_decoded_id).transpose()
}

fn parse_id_list(raw: Option<Vec<String>>) -> Result<Option<Vec<Uuid>>> {
    raw.map(|ids| ids.iter().map(|id| parse_decoded_id(id)).collect())
        .transpose()
}

fn translations_from(dtos: Vec<CategoryTranslationInputDto>) -> Result<Vec<TranslationInput>> {
    let mut seen = HashSet::new();
    for dto in &dtos {
        if !seen.insert(dto.language_code.as_str()) {
            return Err(AppError::Validation(format!(
                "Duplicate translation for language '{}'",
                dto.language_code
            )));
        }
    }
    Ok(dtos.into_iter().map(Into::into).collect())
}
