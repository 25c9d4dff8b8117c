use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::channels::handlers;
use crate::features::channels::services::ChannelService;
use crate::shared::id_codec::IdCodec;

#[derive(Clone)]
pub struct ChannelsState {
    pub service: Arc<ChannelService>,
    pub codec: Arc<IdCodec>,
}

/// Create routes for the channels feature
pub fn routes(service: Arc<ChannelService>, codec: Arc<IdCodec>) -> Router {
    Router::new()
        .route("/api/channels", get(handlers::list_channels))
        .route("/api/channels/active", get(handlers::get_active_channel))
        .with_state(ChannelsState { service, codec })
}
