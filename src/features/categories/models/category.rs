use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::assets::models::Asset;
use crate::shared::translation::Localized;

/// Database model for category
///
/// Relations are loaded separately and attached after the row is read.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub position: i32,
    pub is_root: bool,
    pub featured_asset_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub translations: Vec<CategoryTranslation>,
    /// Ordered as displayed
    #[sqlx(skip)]
    pub asset_ids: Vec<Uuid>,
    #[sqlx(skip)]
    pub channel_ids: Vec<Uuid>,
}

/// Database model for category translation
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CategoryTranslation {
    pub id: Uuid,
    pub category_id: Uuid,
    pub language_code: String,
    pub name: String,
    pub slug: String,
    pub description: String,
}

impl Localized for CategoryTranslation {
    fn language_code(&self) -> &str {
        &self.language_code
    }
}

/// Translation values for insert or upsert by language code
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationInput {
    pub language_code: String,
    pub name: String,
    pub slug: String,
    pub description: String,
}

/// Row values for a new non-root category; the store allocates its position
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub parent_id: Uuid,
    pub channel_id: Uuid,
    pub featured_asset_id: Option<Uuid>,
    pub asset_ids: Vec<Uuid>,
    pub translations: Vec<TranslationInput>,
}

/// Attribute changes; `None` leaves a relation untouched
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub featured_asset_id: Option<Uuid>,
    pub asset_ids: Option<Vec<Uuid>>,
    pub translations: Vec<TranslationInput>,
}

#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    pub parent_id: Option<Uuid>,
    pub featured_asset_id: Option<Uuid>,
    pub asset_ids: Option<Vec<Uuid>>,
    pub translations: Vec<TranslationInput>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    pub featured_asset_id: Option<Uuid>,
    pub asset_ids: Option<Vec<Uuid>>,
    pub translations: Vec<TranslationInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCategoryInput {
    pub category_id: Uuid,
    pub parent_id: Uuid,
    /// Requested slot among the new siblings; clamped into range
    pub index: i64,
}

/// A category with its scalar fields resolved for one language
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedCategory {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub position: i32,
    pub is_root: bool,
    pub language_code: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub featured_asset_id: Option<Uuid>,
    pub asset_ids: Vec<Uuid>,
    pub channel_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Nested view of a subtree, children ordered by position
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTreeNode {
    pub category: TranslatedCategory,
    pub children: Vec<CategoryTreeNode>,
}

/// A translated category with its assets resolved
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDetail {
    pub category: TranslatedCategory,
    pub featured_asset: Option<Asset>,
    pub assets: Vec<Asset>,
}
