use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;
use crate::shared::id_codec::IdCodec;

#[derive(Clone)]
pub struct CategoriesState {
    pub service: Arc<CategoryService>,
    pub codec: Arc<IdCodec>,
}

/// Create routes for the categories feature
///
/// Handlers expect a [`RequestContext`](crate::features::channels::RequestContext)
/// in request extensions; callers layer the request context middleware.
pub fn routes(service: Arc<CategoryService>, codec: Arc<IdCodec>) -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/api/categories/tree", get(handlers::get_category_tree))
        .route(
            "/api/categories/next-position",
            get(handlers::get_next_position),
        )
        .route(
            "/api/categories/{id}",
            get(handlers::get_category).put(handlers::update_category),
        )
        .route("/api/categories/{id}/move", post(handlers::move_category))
        .with_state(CategoriesState { service, codec })
}
