use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::assets::AssetService;
use crate::features::categories::models::{
    Category, CategoryChanges, CategoryDetail, CategoryTreeNode, CreateCategoryInput,
    MoveCategoryInput, NewCategory, TranslatedCategory, TranslationInput, UpdateCategoryInput,
};
use crate::features::categories::repositories::CategoryRepository;
use crate::features::categories::services::category_tree::{build_tree, next_position_after};
use crate::features::categories::services::RootCategoryCache;
use crate::features::channels::RequestContext;
use crate::shared::constants::{
    ROOT_CATEGORY_DESCRIPTION, ROOT_CATEGORY_NAME, ROOT_CATEGORY_SLUG,
};
use crate::shared::events::{CategoryEventKind, EventBus};
use crate::shared::translation::select_translation;

/// Service for category tree operations
pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
    assets: Arc<AssetService>,
    roots: Arc<RootCategoryCache>,
    events: EventBus,
    /// Language of the root category's translation
    default_language_code: String,
}

impl CategoryService {
    pub fn new(
        repository: Arc<dyn CategoryRepository>,
        assets: Arc<AssetService>,
        roots: Arc<RootCategoryCache>,
        events: EventBus,
        default_language_code: String,
    ) -> Self {
        Self {
            repository,
            assets,
            roots,
            events,
            default_language_code,
        }
    }

    /// Non-root categories of the request channel, ordered by position
    pub async fn find_all(
        &self,
        ctx: &RequestContext,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TranslatedCategory>, i64)> {
        let (categories, total) = self
            .repository
            .list(ctx.channel_id(), limit, offset)
            .await?;
        let translated = categories
            .into_iter()
            .map(|c| translate(c, ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok((translated, total))
    }

    pub async fn find_one(&self, ctx: &RequestContext, id: Uuid) -> Result<CategoryDetail> {
        let category = self.find_in_channel(ctx, id).await?;
        self.detail(ctx, category).await
    }

    /// Subtree below `root_id`, or below the channel root when absent
    pub async fn get_tree(
        &self,
        ctx: &RequestContext,
        root_id: Option<Uuid>,
    ) -> Result<CategoryTreeNode> {
        let root = match root_id {
            Some(id) => self.find_in_channel(ctx, id).await?,
            None => self.get_root_category(ctx).await?,
        };

        let channel_id = ctx.channel_id();
        let descendants = self
            .repository
            .find_descendants(root.id)
            .await?
            .into_iter()
            .filter(|c| c.channel_ids.contains(&channel_id))
            .map(|c| translate(c, ctx))
            .collect::<Result<Vec<_>>>()?;

        Ok(build_tree(translate(root, ctx)?, descendants))
    }

    /// Position the next child appended under `parent_id` (default: the
    /// channel root) would receive
    pub async fn next_position(&self, ctx: &RequestContext, parent_id: Option<Uuid>) -> Result<i32> {
        let parent = self.get_parent_category(ctx, parent_id).await?;
        let max = self
            .repository
            .max_child_position(parent.id, ctx.channel_id())
            .await?;
        Ok(next_position_after(max))
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateCategoryInput,
    ) -> Result<CategoryDetail> {
        if input.translations.is_empty() {
            return Err(AppError::Validation(
                "At least one translation is required".to_string(),
            ));
        }

        let parent = self.get_parent_category(ctx, input.parent_id).await?;
        let asset_ids = self
            .resolve_assets(input.featured_asset_id, input.asset_ids.as_deref())
            .await?
            .unwrap_or_default();

        let category = self
            .repository
            .insert(NewCategory {
                parent_id: parent.id,
                channel_id: ctx.channel_id(),
                featured_asset_id: input.featured_asset_id,
                asset_ids,
                translations: input.translations,
            })
            .await?;

        tracing::info!(
            category_id = %category.id,
            parent_id = %parent.id,
            position = category.position,
            "Category created"
        );
        self.events
            .category(ctx.channel_id(), category.id, CategoryEventKind::Created);

        self.detail(ctx, category).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<CategoryDetail> {
        let category = self.find_in_channel(ctx, id).await?;
        let asset_ids = self
            .resolve_assets(input.featured_asset_id, input.asset_ids.as_deref())
            .await?;

        self.repository
            .update(
                category.id,
                CategoryChanges {
                    featured_asset_id: input.featured_asset_id,
                    asset_ids,
                    translations: input.translations,
                },
            )
            .await?;

        tracing::info!(category_id = %category.id, "Category updated");
        self.events
            .category(ctx.channel_id(), category.id, CategoryEventKind::Updated);

        self.find_one(ctx, category.id).await
    }

    /// Move a category under `input.parent_id` at `input.index` among the
    /// new siblings. Nothing is written when validation fails.
    pub async fn move_category(
        &self,
        ctx: &RequestContext,
        input: MoveCategoryInput,
    ) -> Result<CategoryDetail> {
        if input.parent_id == input.category_id {
            return Err(AppError::IllegalOperation(
                "Cannot move a category into itself".to_string(),
            ));
        }

        let category = self.find_in_channel(ctx, input.category_id).await?;
        if category.is_root {
            return Err(AppError::IllegalOperation(
                "The root category cannot be moved".to_string(),
            ));
        }

        let parent = self.find_in_channel(ctx, input.parent_id).await?;
        let descendant_ids = self.repository.find_descendant_ids(category.id).await?;
        if descendant_ids.contains(&parent.id) {
            return Err(AppError::IllegalOperation(
                "Cannot move a category into one of its descendants".to_string(),
            ));
        }

        let outcome = self.repository.apply_move(ctx.channel_id(), input).await?;
        if outcome.plan.is_noop() {
            tracing::debug!(category_id = %category.id, "Move left the category in place");
        } else {
            tracing::info!(
                category_id = %category.id,
                from_parent_id = ?outcome.previous_parent_id,
                to_parent_id = %parent.id,
                position = ?outcome.plan.position_of(category.id),
                "Category moved"
            );
            self.events.category(
                ctx.channel_id(),
                category.id,
                CategoryEventKind::Moved {
                    from_parent_id: outcome.previous_parent_id,
                    to_parent_id: parent.id,
                },
            );
        }

        self.find_one(ctx, category.id).await
    }

    /// Root of the request channel, created on first access
    pub async fn get_root_category(&self, ctx: &RequestContext) -> Result<Category> {
        let channel_id = ctx.channel_id();
        self.roots
            .get_or_try_insert_with(ctx.channel_code(), || async move {
                if let Some(root) = self.repository.find_root(channel_id).await? {
                    return Ok(root);
                }
                self.repository
                    .create_root(
                        channel_id,
                        TranslationInput {
                            language_code: self.default_language_code.clone(),
                            name: ROOT_CATEGORY_NAME.to_string(),
                            slug: ROOT_CATEGORY_SLUG.to_string(),
                            description: ROOT_CATEGORY_DESCRIPTION.to_string(),
                        },
                    )
                    .await
            })
            .await
    }

    async fn get_parent_category(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
    ) -> Result<Category> {
        match parent_id {
            Some(id) => self.find_in_channel(ctx, id).await,
            None => self.get_root_category(ctx).await,
        }
    }

    async fn find_in_channel(&self, ctx: &RequestContext, id: Uuid) -> Result<Category> {
        self.repository
            .find_in_channel(id, ctx.channel_id())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// Check that every referenced asset exists. Returns the asset ids
    /// deduplicated in their given order.
    async fn resolve_assets(
        &self,
        featured_asset_id: Option<Uuid>,
        asset_ids: Option<&[Uuid]>,
    ) -> Result<Option<Vec<Uuid>>> {
        if let Some(featured_asset_id) = featured_asset_id {
            self.assets.find_one(featured_asset_id).await?;
        }
        match asset_ids {
            Some(ids) => {
                let assets = self.assets.find_by_ids(ids).await?;
                Ok(Some(assets.into_iter().map(|a| a.id).collect()))
            }
            None => Ok(None),
        }
    }

    async fn detail(&self, ctx: &RequestContext, category: Category) -> Result<CategoryDetail> {
        let featured = async {
            match category.featured_asset_id {
                Some(id) => self.assets.find_one(id).await.map(Some),
                None => Ok(None),
            }
        };
        let (featured_asset, assets) =
            futures::try_join!(featured, self.assets.find_by_ids(&category.asset_ids))?;

        Ok(CategoryDetail {
            category: translate(category, ctx)?,
            featured_asset,
            assets,
        })
    }
}

/// Resolve a category's translatable fields for the request language
fn translate(category: Category, ctx: &RequestContext) -> Result<TranslatedCategory> {
    let translation = select_translation(
        &category.translations,
        &ctx.language_code,
        ctx.default_language_code(),
    )
    .cloned()
    .ok_or_else(|| {
        AppError::Internal(format!("Category {} has no translations", category.id))
    })?;

    Ok(TranslatedCategory {
        id: category.id,
        parent_id: category.parent_id,
        position: category.position,
        is_root: category.is_root,
        language_code: translation.language_code,
        name: translation.name,
        slug: translation.slug,
        description: translation.description,
        featured_asset_id: category.featured_asset_id,
        asset_ids: category.asset_ids,
        channel_ids: category.channel_ids,
        created_at: category.created_at,
        updated_at: category.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::assets::models::NewAsset;
    use crate::features::assets::repositories::memory::MemoryAssetRepository;
    use crate::features::categories::repositories::memory::MemoryCategoryRepository;
    use crate::features::channels::models::Channel;
    use crate::shared::events::CatalogEvent;
    use crate::shared::test_helpers::{channel, context};

    struct Fixture {
        service: CategoryService,
        repo: Arc<MemoryCategoryRepository>,
        assets: Arc<AssetService>,
        events: EventBus,
        channel: Channel,
        ctx: RequestContext,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MemoryCategoryRepository::default());
        let assets = Arc::new(AssetService::new(Arc::new(MemoryAssetRepository::default())));
        let events = EventBus::new(16);
        let service = CategoryService::new(
            repo.clone(),
            assets.clone(),
            Arc::new(RootCategoryCache::new()),
            events.clone(),
            "en".to_string(),
        );
        let channel = channel("__default_channel__");
        let ctx = context(&channel, None);
        Fixture {
            service,
            repo,
            assets,
            events,
            channel,
            ctx,
        }
    }

    fn translation(language_code: &str, name: &str) -> TranslationInput {
        TranslationInput {
            language_code: language_code.to_string(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: String::new(),
        }
    }

    fn create_input(parent_id: Option<Uuid>, name: &str) -> CreateCategoryInput {
        CreateCategoryInput {
            parent_id,
            featured_asset_id: None,
            asset_ids: None,
            translations: vec![translation("en", name)],
        }
    }

    async fn create(fx: &Fixture, parent_id: Option<Uuid>, name: &str) -> Uuid {
        fx.service
            .create(&fx.ctx, create_input(parent_id, name))
            .await
            .unwrap()
            .category
            .id
    }

    /// Children of `parent_id` as (name, position), in position order
    async fn children(fx: &Fixture, parent_id: Uuid) -> Vec<(String, i32)> {
        fx.repo
            .children(parent_id, fx.channel.id)
            .into_iter()
            .map(|c| (c.translations[0].name.clone(), c.position))
            .collect()
    }

    fn rows(expected: &[(&str, i32)]) -> Vec<(String, i32)> {
        expected
            .iter()
            .map(|(name, position)| (name.to_string(), *position))
            .collect()
    }

    fn move_input(category_id: Uuid, parent_id: Uuid, index: i64) -> MoveCategoryInput {
        MoveCategoryInput {
            category_id,
            parent_id,
            index,
        }
    }

    #[tokio::test]
    async fn test_root_is_created_once_and_cached() {
        let fx = fixture();

        let first = fx.service.get_root_category(&fx.ctx).await.unwrap();
        let second = fx.service.get_root_category(&fx.ctx).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.is_root);
        assert_eq!(first.position, 0);
        assert_eq!(first.translations[0].name, ROOT_CATEGORY_NAME);
        assert_eq!(first.translations[0].description, ROOT_CATEGORY_DESCRIPTION);
        assert_eq!(fx.repo.root_lookups(), 1);
    }

    #[tokio::test]
    async fn test_each_channel_gets_its_own_root() {
        let fx = fixture();
        let wholesale = context(&channel("wholesale"), None);

        let default_root = fx.service.get_root_category(&fx.ctx).await.unwrap();
        let wholesale_root = fx.service.get_root_category(&wholesale).await.unwrap();

        assert_ne!(default_root.id, wholesale_root.id);
        assert_eq!(fx.repo.root_lookups(), 2);
    }

    #[tokio::test]
    async fn test_next_position_on_empty_parent_is_zero() {
        let fx = fixture();
        assert_eq!(fx.service.next_position(&fx.ctx, None).await.unwrap(), 0);

        let parent = create(&fx, None, "Clothing").await;
        assert_eq!(
            fx.service.next_position(&fx.ctx, Some(parent)).await.unwrap(),
            0
        );

        create(&fx, Some(parent), "Shirts").await;
        create(&fx, Some(parent), "Shoes").await;
        assert_eq!(
            fx.service.next_position(&fx.ctx, Some(parent)).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_create_appends_under_root_by_default() {
        let fx = fixture();

        create(&fx, None, "A").await;
        create(&fx, None, "B").await;
        create(&fx, None, "C").await;

        let root = fx.service.get_root_category(&fx.ctx).await.unwrap();
        assert_eq!(
            children(&fx, root.id).await,
            rows(&[("A", 0), ("B", 1), ("C", 2)])
        );
    }

    #[tokio::test]
    async fn test_create_rejects_missing_parent_and_assets() {
        let fx = fixture();

        let result = fx
            .service
            .create(&fx.ctx, create_input(Some(Uuid::new_v4()), "Orphan"))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let mut input = create_input(None, "With assets");
        input.asset_ids = Some(vec![Uuid::new_v4()]);
        let result = fx.service.create(&fx.ctx, input).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let mut input = create_input(None, "Untitled");
        input.translations.clear();
        let result = fx.service.create(&fx.ctx, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        assert_eq!(fx.repo.writes(), 1, "only the root row was written");
    }

    #[tokio::test]
    async fn test_create_resolves_assets_in_order() {
        let fx = fixture();
        let mut ids = Vec::new();
        for name in ["front.jpg", "back.jpg"] {
            let asset = fx
                .assets
                .create(NewAsset {
                    name: name.to_string(),
                    source: format!("https://cdn.example.com/{name}"),
                    mime_type: "image/jpeg".to_string(),
                })
                .await
                .unwrap();
            ids.push(asset.id);
        }

        let mut input = create_input(None, "Shirts");
        input.featured_asset_id = Some(ids[1]);
        input.asset_ids = Some(vec![ids[1], ids[0], ids[1]]);
        let detail = fx.service.create(&fx.ctx, input).await.unwrap();

        assert_eq!(detail.featured_asset.unwrap().id, ids[1]);
        let names: Vec<&str> = detail.assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["back.jpg", "front.jpg"]);
    }

    #[tokio::test]
    async fn test_find_one_is_scoped_to_channel() {
        let fx = fixture();
        let id = create(&fx, None, "Shirts").await;
        let wholesale = context(&channel("wholesale"), None);

        assert!(fx.service.find_one(&fx.ctx, id).await.is_ok());
        let result = fx.service.find_one(&wholesale, id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_all_excludes_root_and_translates() {
        let fx = fixture();
        let mut input = create_input(None, "Shirts");
        input.translations.push(translation("de", "Hemden"));
        fx.service.create(&fx.ctx, input).await.unwrap();
        create(&fx, None, "Shoes").await;

        let german = context(&fx.channel, Some("de"));
        let (categories, total) = fx.service.find_all(&german, 10, 0).await.unwrap();

        assert_eq!(total, 2);
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        // "Shoes" has no German translation and falls back to English
        assert_eq!(names, vec!["Hemden", "Shoes"]);
        assert_eq!(categories[0].language_code, "de");
        assert_eq!(categories[1].language_code, "en");
    }

    #[tokio::test]
    async fn test_update_upserts_translations() {
        let fx = fixture();
        let id = create(&fx, None, "Shirts").await;
        let mut rx = fx.events.subscribe();

        let updated = fx
            .service
            .update(
                &fx.ctx,
                id,
                UpdateCategoryInput {
                    translations: vec![translation("en", "T-Shirts"), translation("de", "Hemden")],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.category.name, "T-Shirts");
        assert_eq!(fx.repo.snapshot(id).unwrap().translations.len(), 2);
        match rx.try_recv().unwrap() {
            CatalogEvent::Category(event) => {
                assert_eq!(event.category_id, id);
                assert_eq!(event.kind, CategoryEventKind::Updated);
            }
        }
    }

    #[tokio::test]
    async fn test_move_into_self_or_descendant_is_illegal() {
        let fx = fixture();
        let c = create(&fx, None, "C").await;
        let child = create(&fx, Some(c), "Child").await;
        let grandchild = create(&fx, Some(child), "Grandchild").await;
        let writes = fx.repo.writes();

        for target in [c, child, grandchild] {
            let result = fx
                .service
                .move_category(&fx.ctx, move_input(c, target, 0))
                .await;
            assert!(
                matches!(result, Err(AppError::IllegalOperation(_))),
                "moving into {target} must be rejected"
            );
        }
        assert_eq!(fx.repo.writes(), writes);
    }

    #[tokio::test]
    async fn test_move_root_is_illegal() {
        let fx = fixture();
        let root = fx.service.get_root_category(&fx.ctx).await.unwrap();
        let other = create(&fx, None, "Other").await;

        let result = fx
            .service
            .move_category(&fx.ctx, move_input(root.id, other, 0))
            .await;
        assert!(matches!(result, Err(AppError::IllegalOperation(_))));
    }

    #[tokio::test]
    async fn test_move_to_unknown_parent_is_not_found() {
        let fx = fixture();
        let c = create(&fx, None, "C").await;

        let result = fx
            .service
            .move_category(&fx.ctx, move_input(c, Uuid::new_v4(), 0))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = fx
            .service
            .move_category(&fx.ctx, move_input(Uuid::new_v4(), c, 0))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_move_within_parent_reorders_siblings() {
        let fx = fixture();
        let p = create(&fx, None, "P").await;
        create(&fx, Some(p), "A").await;
        let b = create(&fx, Some(p), "B").await;
        create(&fx, Some(p), "C").await;

        let moved = fx
            .service
            .move_category(&fx.ctx, move_input(b, p, 0))
            .await
            .unwrap();

        assert_eq!(moved.category.position, 0);
        assert_eq!(
            children(&fx, p).await,
            rows(&[("B", 0), ("A", 1), ("C", 2)])
        );
    }

    #[tokio::test]
    async fn test_move_to_current_slot_writes_nothing() {
        let fx = fixture();
        let p = create(&fx, None, "P").await;
        create(&fx, Some(p), "A").await;
        let b = create(&fx, Some(p), "B").await;
        let writes = fx.repo.writes();
        let mut rx = fx.events.subscribe();

        fx.service
            .move_category(&fx.ctx, move_input(b, p, 1))
            .await
            .unwrap();

        assert_eq!(fx.repo.writes(), writes);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_move_across_parents_reindexes_both() {
        let fx = fixture();
        let p1 = create(&fx, None, "P1").await;
        let p2 = create(&fx, None, "P2").await;
        create(&fx, Some(p1), "W").await;
        let x = create(&fx, Some(p1), "X").await;
        create(&fx, Some(p1), "Z").await;
        create(&fx, Some(p2), "Y").await;
        let mut rx = fx.events.subscribe();

        let moved = fx
            .service
            .move_category(&fx.ctx, move_input(x, p2, 0))
            .await
            .unwrap();

        assert_eq!(moved.category.parent_id, Some(p2));
        assert_eq!(children(&fx, p2).await, rows(&[("X", 0), ("Y", 1)]));
        assert_eq!(children(&fx, p1).await, rows(&[("W", 0), ("Z", 1)]));
        match rx.try_recv().unwrap() {
            CatalogEvent::Category(event) => assert_eq!(
                event.kind,
                CategoryEventKind::Moved {
                    from_parent_id: Some(p1),
                    to_parent_id: p2,
                }
            ),
        }
    }

    #[tokio::test]
    async fn test_move_past_end_appends_contiguously() {
        let fx = fixture();
        let p = create(&fx, None, "P").await;
        let a = create(&fx, Some(p), "A").await;
        create(&fx, Some(p), "B").await;
        create(&fx, Some(p), "C").await;

        fx.service
            .move_category(&fx.ctx, move_input(a, p, 99))
            .await
            .unwrap();

        assert_eq!(
            children(&fx, p).await,
            rows(&[("B", 0), ("C", 1), ("A", 2)])
        );
    }

    #[tokio::test]
    async fn test_get_tree_nests_children_in_order() {
        let fx = fixture();
        let clothing = create(&fx, None, "Clothing").await;
        let shoes = create(&fx, Some(clothing), "Shoes").await;
        create(&fx, Some(clothing), "Shirts").await;
        create(&fx, Some(shoes), "Boots").await;
        create(&fx, None, "Garden").await;

        let tree = fx.service.get_tree(&fx.ctx, None).await.unwrap();
        assert!(tree.category.is_root);
        let top: Vec<&str> = tree
            .children
            .iter()
            .map(|n| n.category.name.as_str())
            .collect();
        assert_eq!(top, vec!["Clothing", "Garden"]);

        let subtree = fx.service.get_tree(&fx.ctx, Some(clothing)).await.unwrap();
        assert_eq!(subtree.category.name, "Clothing");
        assert_eq!(subtree.children[0].category.name, "Shoes");
        assert_eq!(subtree.children[0].children[0].category.name, "Boots");
        assert_eq!(subtree.children[1].category.name, "Shirts");

        let result = fx.service.get_tree(&fx.ctx, Some(Uuid::new_v4())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
