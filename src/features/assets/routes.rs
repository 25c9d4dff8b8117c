use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::assets::handlers;
use crate::features::assets::services::AssetService;
use crate::shared::id_codec::IdCodec;

#[derive(Clone)]
pub struct AssetsState {
    pub service: Arc<AssetService>,
    pub codec: Arc<IdCodec>,
}

/// Create routes for the assets feature
pub fn routes(service: Arc<AssetService>, codec: Arc<IdCodec>) -> Router {
    Router::new()
        .route(
            "/api/assets",
            get(handlers::list_assets).post(handlers::create_asset),
        )
        .route("/api/assets/{id}", get(handlers::get_asset))
        .with_state(AssetsState { service, codec })
}
