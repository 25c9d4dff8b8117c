use std::collections::HashMap;
use std::future::Future;

use tokio::sync::{Mutex, RwLock};

use crate::core::error::Result;
use crate::features::categories::models::Category;

/// Root category per channel code.
///
/// Entries are never invalidated: a channel's root is created once and
/// never moved or deleted.
#[derive(Debug, Default)]
pub struct RootCategoryCache {
    roots: RwLock<HashMap<String, Category>>,
    creation: Mutex<()>,
}

impl RootCategoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, channel_code: &str) -> Option<Category> {
        self.roots.read().await.get(channel_code).cloned()
    }

    /// Return the cached root, or run `init` once and cache its result.
    ///
    /// Concurrent misses for the same channel wait on one another; only the
    /// first runs `init`. A failed `init` caches nothing.
    pub async fn get_or_try_insert_with<F, Fut>(&self, channel_code: &str, init: F) -> Result<Category>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Category>>,
    {
        if let Some(root) = self.get(channel_code).await {
            return Ok(root);
        }

        let _guard = self.creation.lock().await;
        if let Some(root) = self.get(channel_code).await {
            return Ok(root);
        }

        let root = init().await?;
        self.roots
            .write()
            .await
            .insert(channel_code.to_string(), root.clone());
        tracing::debug!(channel = %channel_code, root_id = %root.id, "Cached root category");
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    fn root() -> Category {
        Category {
            id: Uuid::new_v4(),
            parent_id: None,
            position: 0,
            is_root: true,
            featured_asset_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            translations: vec![],
            asset_ids: vec![],
            channel_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_init_runs_once_per_channel() {
        let cache = RootCategoryCache::new();
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_try_insert_with("default", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(root())
            })
            .await
            .unwrap();
        let second = cache
            .get_or_try_insert_with("default", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(root())
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.get("other").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_misses_create_one_root() {
        let cache = Arc::new(RootCategoryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_try_insert_with("default", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        Ok(root())
                    })
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids: Vec<Uuid> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_init_is_not_cached() {
        let cache = RootCategoryCache::new();

        let result = cache
            .get_or_try_insert_with("default", || async {
                Err(AppError::Internal("boom".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.get("default").await.is_none());
    }
}
