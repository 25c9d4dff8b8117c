use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::categories::models::{
    Category, CategoryChanges, MoveCategoryInput, NewCategory, TranslationInput,
};
use crate::features::categories::services::category_tree::MovePlan;

/// Result of [`CategoryRepository::apply_move`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub previous_parent_id: Option<Uuid>,
    pub plan: MovePlan,
}

/// Category tree persistence.
///
/// Returned categories carry their translations, asset ids and channel ids.
/// Sibling lookups are scoped to one channel.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Find a category that is assigned to `channel_id`
    async fn find_in_channel(&self, id: Uuid, channel_id: Uuid) -> Result<Option<Category>>;

    /// Non-root categories of a channel ordered by position, with the total
    async fn list(&self, channel_id: Uuid, limit: i64, offset: i64) -> Result<(Vec<Category>, i64)>;

    async fn find_root(&self, channel_id: Uuid) -> Result<Option<Category>>;

    /// Create the root of a channel, or return the root another caller
    /// created first. Never produces a second root for a channel.
    async fn create_root(&self, channel_id: Uuid, translation: TranslationInput) -> Result<Category>;

    async fn max_child_position(&self, parent_id: Uuid, channel_id: Uuid) -> Result<Option<i32>>;

    /// Ids of every category below `id`, excluding `id` itself
    async fn find_descendant_ids(&self, id: Uuid) -> Result<Vec<Uuid>>;

    /// Every category below `id`, excluding `id` itself
    async fn find_descendants(&self, id: Uuid) -> Result<Vec<Category>>;

    /// Insert at the next position under the parent
    async fn insert(&self, category: NewCategory) -> Result<Category>;

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> Result<()>;

    /// Relocate a category and renumber the affected siblings atomically.
    /// Callers validate the move first.
    async fn apply_move(&self, channel_id: Uuid, input: MoveCategoryInput) -> Result<MoveOutcome>;
}
