use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::Result;
use crate::features::channels::models::Channel;
use crate::shared::id_codec::EntityIds;

/// Response DTO for channel
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelResponseDto {
    pub id: String,
    pub code: String,
    pub token: String,
    pub default_language_code: String,
}

impl From<Channel> for ChannelResponseDto {
    fn from(c: Channel) -> Self {
        Self {
            id: c.id.to_string(),
            code: c.code,
            token: c.token,
            default_language_code: c.default_language_code,
        }
    }
}

impl EntityIds for ChannelResponseDto {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()> {
        self.id.visit_ids(visit)
    }
}
