use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::core::database::map_db_error;
use crate::core::error::{AppError, Result};
use crate::features::categories::models::{
    Category, CategoryChanges, CategoryTranslation, MoveCategoryInput, NewCategory,
    TranslationInput,
};
use crate::features::categories::repositories::{CategoryRepository, MoveOutcome};
use crate::features::categories::services::category_tree::{
    next_position_after, plan_move, FIRST_POSITION,
};

const CATEGORY_COLUMNS: &str =
    "c.id, c.parent_id, c.position, c.is_root, c.featured_asset_id, c.created_at, c.updated_at";

#[derive(Debug, FromRow)]
struct CategoryAssetRow {
    category_id: Uuid,
    asset_id: Uuid,
}

#[derive(Debug, FromRow)]
struct CategoryChannelRow {
    category_id: Uuid,
    channel_id: Uuid,
}

/// PostgreSQL category store (adjacency list, recursive queries for subtrees)
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>> {
        self.pool.acquire().await.map_err(|e| {
            tracing::error!("Failed to acquire connection: {:?}", e);
            AppError::Database(e)
        })
    }
}

/// Attach translations, asset ids and channel ids to loaded rows
async fn hydrate(conn: &mut PgConnection, mut categories: Vec<Category>) -> Result<Vec<Category>> {
    if categories.is_empty() {
        return Ok(categories);
    }

    let ids: Vec<Uuid> = categories.iter().map(|c| c.id).collect();
    let index: HashMap<Uuid, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let translations = sqlx::query_as::<_, CategoryTranslation>(
        r#"
        SELECT id, category_id, language_code, name, slug, description
        FROM category_translations
        WHERE category_id = ANY($1)
        ORDER BY language_code
        "#,
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await
    .map_err(AppError::Database)?;

    let assets = sqlx::query_as::<_, CategoryAssetRow>(
        r#"
        SELECT category_id, asset_id
        FROM category_assets
        WHERE category_id = ANY($1)
        ORDER BY position
        "#,
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await
    .map_err(AppError::Database)?;

    let channels = sqlx::query_as::<_, CategoryChannelRow>(
        r#"
        SELECT category_id, channel_id
        FROM category_channels
        WHERE category_id = ANY($1)
        "#,
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await
    .map_err(AppError::Database)?;

    for translation in translations {
        if let Some(&i) = index.get(&translation.category_id) {
            categories[i].translations.push(translation);
        }
    }
    for row in assets {
        if let Some(&i) = index.get(&row.category_id) {
            categories[i].asset_ids.push(row.asset_id);
        }
    }
    for row in channels {
        if let Some(&i) = index.get(&row.category_id) {
            categories[i].channel_ids.push(row.channel_id);
        }
    }

    Ok(categories)
}

async fn load_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories c WHERE c.id = $1",
        CATEGORY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(AppError::Database)?;

    match row {
        Some(category) => Ok(hydrate(conn, vec![category]).await?.pop()),
        None => Ok(None),
    }
}

async fn child_ids(conn: &mut PgConnection, parent_id: Uuid, channel_id: Uuid) -> Result<Vec<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT c.id
        FROM categories c
        JOIN category_channels cc ON cc.category_id = c.id
        WHERE c.parent_id = $1 AND cc.channel_id = $2
        ORDER BY c.position, c.id
        "#,
    )
    .bind(parent_id)
    .bind(channel_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(AppError::Database)
}

async fn upsert_translations(
    conn: &mut PgConnection,
    category_id: Uuid,
    translations: &[TranslationInput],
) -> Result<()> {
    for translation in translations {
        sqlx::query(
            r#"
            INSERT INTO category_translations (id, category_id, language_code, name, slug, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (category_id, language_code)
            DO UPDATE SET name = EXCLUDED.name,
                          slug = EXCLUDED.slug,
                          description = EXCLUDED.description
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(category_id)
        .bind(&translation.language_code)
        .bind(&translation.name)
        .bind(&translation.slug)
        .bind(&translation.description)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;
    }
    Ok(())
}

async fn replace_assets(conn: &mut PgConnection, category_id: Uuid, asset_ids: &[Uuid]) -> Result<()> {
    sqlx::query("DELETE FROM category_assets WHERE category_id = $1")
        .bind(category_id)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    if asset_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO category_assets (category_id, asset_id, position)
        SELECT $1, a.asset_id, (a.ord - 1)::int
        FROM UNNEST($2::uuid[]) WITH ORDINALITY AS a(asset_id, ord)
        "#,
    )
    .bind(category_id)
    .bind(asset_ids)
    .execute(&mut *conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_in_channel(&self, id: Uuid, channel_id: Uuid) -> Result<Option<Category>> {
        let mut conn = self.connection().await?;
        let row = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {}
            FROM categories c
            JOIN category_channels cc ON cc.category_id = c.id
            WHERE c.id = $1 AND cc.channel_id = $2
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .bind(channel_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find category in channel: {:?}", e);
            AppError::Database(e)
        })?;

        match row {
            Some(category) => Ok(hydrate(&mut conn, vec![category]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, channel_id: Uuid, limit: i64, offset: i64) -> Result<(Vec<Category>, i64)> {
        let mut conn = self.connection().await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM categories c
            JOIN category_channels cc ON cc.category_id = c.id
            WHERE cc.channel_id = $1 AND c.is_root = FALSE
            "#,
        )
        .bind(channel_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        let rows = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {}
            FROM categories c
            JOIN category_channels cc ON cc.category_id = c.id
            WHERE cc.channel_id = $1 AND c.is_root = FALSE
            ORDER BY c.position, c.id
            LIMIT $2 OFFSET $3
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(channel_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((hydrate(&mut conn, rows).await?, total))
    }

    async fn find_root(&self, channel_id: Uuid) -> Result<Option<Category>> {
        let mut conn = self.connection().await?;
        let row = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {}
            FROM categories c
            JOIN category_channels cc ON cc.category_id = c.id
            WHERE c.is_root = TRUE AND cc.channel_id = $1
            LIMIT 1
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(channel_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        match row {
            Some(category) => Ok(hydrate(&mut conn, vec![category]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_root(&self, channel_id: Uuid, translation: TranslationInput) -> Result<Category> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Row lock on the channel serializes concurrent root creation
        let channel: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM channels WHERE id = $1 FOR UPDATE")
                .bind(channel_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        if channel.is_none() {
            return Err(AppError::NotFound(format!(
                "Channel with id {} not found",
                channel_id
            )));
        }

        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT category_id FROM channel_root_categories WHERE channel_id = $1",
        )
        .bind(channel_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        let root_id = match existing {
            Some(id) => id,
            None => {
                let id = Uuid::now_v7();
                sqlx::query(
                    r#"
                    INSERT INTO categories (id, parent_id, position, is_root)
                    VALUES ($1, NULL, $2, TRUE)
                    "#,
                )
                .bind(id)
                .bind(FIRST_POSITION)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;

                upsert_translations(&mut tx, id, std::slice::from_ref(&translation)).await?;

                sqlx::query(
                    "INSERT INTO category_channels (category_id, channel_id) VALUES ($1, $2)",
                )
                .bind(id)
                .bind(channel_id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;

                sqlx::query(
                    "INSERT INTO channel_root_categories (channel_id, category_id) VALUES ($1, $2)",
                )
                .bind(channel_id)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;

                tracing::info!(channel_id = %channel_id, root_id = %id, "Created root category");
                id
            }
        };

        let root = load_by_id(&mut tx, root_id)
            .await?
            .ok_or_else(|| AppError::Internal("Root category vanished during creation".to_string()))?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(root)
    }

    async fn max_child_position(&self, parent_id: Uuid, channel_id: Uuid) -> Result<Option<i32>> {
        let mut conn = self.connection().await?;
        sqlx::query_scalar::<_, Option<i32>>(
            r#"
            SELECT MAX(c.position)
            FROM categories c
            JOIN category_channels cc ON cc.category_id = c.id
            WHERE c.parent_id = $1 AND cc.channel_id = $2
            "#,
        )
        .bind(parent_id)
        .bind(channel_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)
    }

    async fn find_descendant_ids(&self, id: Uuid) -> Result<Vec<Uuid>> {
        let mut conn = self.connection().await?;
        sqlx::query_scalar::<_, Uuid>(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM categories WHERE parent_id = $1
                UNION ALL
                SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id
            )
            SELECT id FROM subtree
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await
        .map_err(AppError::Database)
    }

    async fn find_descendants(&self, id: Uuid) -> Result<Vec<Category>> {
        let mut conn = self.connection().await?;
        let rows = sqlx::query_as::<_, Category>(&format!(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM categories WHERE parent_id = $1
                UNION ALL
                SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id
            )
            SELECT {}
            FROM categories c
            WHERE c.id IN (SELECT id FROM subtree)
            ORDER BY c.position, c.id
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load descendants: {:?}", e);
            AppError::Database(e)
        })?;

        hydrate(&mut conn, rows).await
    }

    async fn insert(&self, category: NewCategory) -> Result<Category> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Lock the parent so concurrent inserts do not share a position
        let parent: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
                .bind(category.parent_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        if parent.is_none() {
            return Err(AppError::NotFound(format!(
                "Category with id {} not found",
                category.parent_id
            )));
        }

        let max_position: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT MAX(c.position)
            FROM categories c
            JOIN category_channels cc ON cc.category_id = c.id
            WHERE c.parent_id = $1 AND cc.channel_id = $2
            "#,
        )
        .bind(category.parent_id)
        .bind(category.channel_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        let id = Uuid::now_v7();
        sqlx::query(
            r#"
            INSERT INTO categories (id, parent_id, position, is_root, featured_asset_id)
            VALUES ($1, $2, $3, FALSE, $4)
            "#,
        )
        .bind(id)
        .bind(category.parent_id)
        .bind(next_position_after(max_position))
        .bind(category.featured_asset_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        upsert_translations(&mut tx, id, &category.translations).await?;
        replace_assets(&mut tx, id, &category.asset_ids).await?;

        sqlx::query("INSERT INTO category_channels (category_id, channel_id) VALUES ($1, $2)")
            .bind(id)
            .bind(category.channel_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let created = load_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::Internal("Category vanished during creation".to_string()))?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET featured_asset_id = COALESCE($2, featured_asset_id),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.featured_asset_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Category with id {} not found",
                id
            )));
        }

        if let Some(asset_ids) = &changes.asset_ids {
            replace_assets(&mut tx, id, asset_ids).await?;
        }
        upsert_translations(&mut tx, id, &changes.translations).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn apply_move(&self, channel_id: Uuid, input: MoveCategoryInput) -> Result<MoveOutcome> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let current_parent_id: Option<Uuid> =
            sqlx::query_scalar::<_, Option<Uuid>>("SELECT parent_id FROM categories WHERE id = $1")
                .bind(input.category_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Category with id {} not found", input.category_id))
                })?;

        // Lock target and both parents in id order
        let mut lock_ids = vec![input.category_id, input.parent_id];
        lock_ids.extend(current_parent_id);
        lock_ids.sort();
        lock_ids.dedup();
        sqlx::query("SELECT id FROM categories WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(&lock_ids[..])
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let locked_parent_id: Option<Uuid> =
            sqlx::query_scalar("SELECT parent_id FROM categories WHERE id = $1")
                .bind(input.category_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        if locked_parent_id != current_parent_id {
            return Err(AppError::Conflict(
                "Category was moved concurrently, please retry".to_string(),
            ));
        }

        // Re-checked under lock: a concurrent move may have re-parented the target's subtree
        let creates_cycle: bool = sqlx::query_scalar(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM categories WHERE id = $1
                UNION ALL
                SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id
            )
            SELECT EXISTS (SELECT 1 FROM subtree WHERE id = $2)
            "#,
        )
        .bind(input.category_id)
        .bind(input.parent_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;
        if creates_cycle {
            return Err(AppError::IllegalOperation(
                "Cannot move a category into itself or one of its descendants".to_string(),
            ));
        }

        let new_siblings = child_ids(&mut tx, input.parent_id, channel_id).await?;
        let old_siblings = match current_parent_id {
            Some(parent_id) if parent_id != input.parent_id => {
                child_ids(&mut tx, parent_id, channel_id).await?
            }
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

        if !plan.is_noop() {
            let ids: Vec<Uuid> = plan.placements.iter().map(|p| p.id).collect();
            let parents: Vec<Uuid> = plan.placements.iter().map(|p| p.parent_id).collect();
            let positions: Vec<i32> = plan.placements.iter().map(|p| p.position).collect();

            sqlx::query(
                r#"
                UPDATE categories AS c
                SET parent_id = u.parent_id,
                    position = u.position,
                    updated_at = NOW()
                FROM UNNEST($1::uuid[], $2::uuid[], $3::int4[]) AS u(id, parent_id, position)
                WHERE c.id = u.id
                "#,
            )
            .bind(&ids[..])
            .bind(&parents[..])
            .bind(&positions[..])
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        tracing::debug!(
            category_id = %input.category_id,
            rows = plan.placements.len(),
            "Applied category move"
        );

        Ok(MoveOutcome {
            previous_parent_id: current_parent_id,
            plan,
        })
    }
}
