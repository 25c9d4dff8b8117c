use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{
    Category, CategoryChanges, CategoryTranslation, MoveCategoryInput, NewCategory,
    TranslationInput,
};
use crate::features::categories::repositories::{CategoryRepository, MoveOutcome};
use crate::features::categories::services::category_tree::{
    next_position_after, plan_move, FIRST_POSITION,
};

/// Category store backed by a vector, for tests.
///
/// Counts root lookups and row writes so tests can assert on store traffic.
#[derive(Default)]
pub struct MemoryCategoryRepository {
    categories: Mutex<Vec<Category>>,
    root_lookups: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryCategoryRepository {
    pub fn root_lookups(&self) -> usize {
        self.root_lookups.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self, id: Uuid) -> Option<Category> {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Direct children ordered by position
    pub fn children(&self, parent_id: Uuid, channel_id: Uuid) -> Vec<Category> {
        Self::children_of(&self.categories.lock().unwrap(), parent_id, channel_id)
    }

    fn children_of(categories: &[Category], parent_id: Uuid, channel_id: Uuid) -> Vec<Category> {
        let mut children: Vec<Category> = categories
            .iter()
            .filter(|c| c.parent_id == Some(parent_id) && c.channel_ids.contains(&channel_id))
            .cloned()
            .collect();
        children.sort_by_key(|c| (c.position, c.id));
        children
    }

    fn descendants_of(categories: &[Category], id: Uuid) -> Vec<Category> {
        let mut found = Vec::new();
        let mut frontier = vec![id];
        while let Some(parent_id) = frontier.pop() {
            for child in categories.iter().filter(|c| c.parent_id == Some(parent_id)) {
                frontier.push(child.id);
                found.push(child.clone());
            }
        }
        found
    }

    fn upsert_translations(category: &mut Category, translations: Vec<TranslationInput>) {
        for input in translations {
            match category
                .translations
                .iter_mut()
                .find(|t| t.language_code == input.language_code)
            {
                Some(existing) => {
                    existing.name = input.name;
                    existing.slug = input.slug;
                    existing.description = input.description;
                }
                None => category.translations.push(CategoryTranslation {
                    id: Uuid::now_v7(),
                    category_id: category.id,
                    language_code: input.language_code,
                    name: input.name,
                    slug: input.slug,
                    description: input.description,
                }),
            }
        }
        category
            .translations
            .sort_by(|a, b| a.language_code.cmp(&b.language_code));
    }

    fn new_row(id: Uuid, parent_id: Option<Uuid>, position: i32, channel_id: Uuid) -> Category {
        let now = Utc::now();
        Category {
            id,
            parent_id,
            position,
            is_root: parent_id.is_none(),
            featured_asset_id: None,
            created_at: now,
            updated_at: now,
            translations: vec![],
            asset_ids: vec![],
            channel_ids: vec![channel_id],
        }
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn find_in_channel(&self, id: Uuid, channel_id: Uuid) -> Result<Option<Category>> {
        Ok(self.snapshot(id).filter(|c| c.channel_ids.contains(&channel_id)))
    }

    async fn list(&self, channel_id: Uuid, limit: i64, offset: i64) -> Result<(Vec<Category>, i64)> {
        let categories = self.categories.lock().unwrap();
        let mut matching: Vec<Category> = categories
            .iter()
            .filter(|c| !c.is_root && c.channel_ids.contains(&channel_id))
            .cloned()
            .collect();
        matching.sort_by_key(|c| (c.position, c.id));
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_root(&self, channel_id: Uuid) -> Result<Option<Category>> {
        self.root_lookups.fetch_add(1, Ordering::SeqCst);
        let categories = self.categories.lock().unwrap();
        Ok(categories
            .iter()
            .find(|c| c.is_root && c.channel_ids.contains(&channel_id))
            .cloned())
    }

    async fn create_root(&self, channel_id: Uuid, translation: TranslationInput) -> Result<Category> {
        let mut categories = self.categories.lock().unwrap();
        if let Some(existing) = categories
            .iter()
            .find(|c| c.is_root && c.channel_ids.contains(&channel_id))
        {
            return Ok(existing.clone());
        }

        let mut root = Self::new_row(Uuid::now_v7(), None, FIRST_POSITION, channel_id);
        Self::upsert_translations(&mut root, vec![translation]);
        categories.push(root.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(root)
    }

    async fn max_child_position(&self, parent_id: Uuid, channel_id: Uuid) -> Result<Option<i32>> {
        let categories = self.categories.lock().unwrap();
        Ok(Self::children_of(&categories, parent_id, channel_id)
            .iter()
            .map(|c| c.position)
            .max())
    }

    async fn find_descendant_ids(&self, id: Uuid) -> Result<Vec<Uuid>> {
        let categories = self.categories.lock().unwrap();
        Ok(Self::descendants_of(&categories, id)
            .into_iter()
            .map(|c| c.id)
            .collect())
    }

    async fn find_descendants(&self, id: Uuid) -> Result<Vec<Category>> {
        let categories = self.categories.lock().unwrap();
        Ok(Self::descendants_of(&categories, id))
    }

    async fn insert(&self, category: NewCategory) -> Result<Category> {
        let mut categories = self.categories.lock().unwrap();
        if !categories.iter().any(|c| c.id == category.parent_id) {
            return Err(AppError::NotFound(format!(
                "Category with id {} not found",
                category.parent_id
            )));
        }

        let max = Self::children_of(&categories, category.parent_id, category.channel_id)
            .iter()
            .map(|c| c.position)
            .max();
        let mut row = Self::new_row(
            Uuid::now_v7(),
            Some(category.parent_id),
            next_position_after(max),
            category.channel_id,
        );
        row.featured_asset_id = category.featured_asset_id;
        row.asset_ids = category.asset_ids;
        Self::upsert_translations(&mut row, category.translations);

        categories.push(row.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> Result<()> {
        let mut categories = self.categories.lock().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))?;

        if changes.featured_asset_id.is_some() {
            category.featured_asset_id = changes.featured_asset_id;
        }
        if let Some(asset_ids) = changes.asset_ids {
            category.asset_ids = asset_ids;
        }
        Self::upsert_translations(category, changes.translations);
        category.updated_at = Utc::now();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn apply_move(&self, channel_id: Uuid, input: MoveCategoryInput) -> Result<MoveOutcome> {
        let mut categories = self.categories.lock().unwrap();
        let current_parent_id = categories
            .iter()
            .find(|c| c.id == input.category_id)
            .map(|c| c.parent_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Category with id {} not found", input.category_id))
            })?;

        let subtree: HashSet<Uuid> = Self::descendants_of(&categories, input.category_id)
            .into_iter()
            .map(|c| c.id)
            .collect();
        if input.parent_id == input.category_id || subtree.contains(&input.parent_id) {
            return Err(AppError::IllegalOperation(
                "Cannot move a category into itself or one of its descendants".to_string(),
            ));
        }

        let ids = |parent_id: Uuid| -> Vec<Uuid> {
            Self::children_of(&categories, parent_id, channel_id)
                .into_iter()
                .map(|c| c.id)
                .collect()
        };
        let new_siblings = ids(input.parent_id);
        let old_siblings = match current_parent_id {
            Some(parent_id) if parent_id != input.parent_id => ids(parent_id),
            _ => Vec::new(),
        };

        let plan = plan_move(
            input.category_id,
            current_parent_id,
            input.parent_id,
            &new_siblings,
            &old_siblings,
            input.index,
        );

        let now = Utc::now();
        for placement in &plan.placements {
            if let Some(row) = categories.iter_mut().find(|c| c.id == placement.id) {
                row.parent_id = Some(placement.parent_id);
                row.position = placement.position;
                row.updated_at = now;
                self.writes.fetch_add(1, Ordering::SeqCst);
            }
        }

        Ok(MoveOutcome {
            previous_parent_id: current_parent_id,
            plan,
        })
    }
}
