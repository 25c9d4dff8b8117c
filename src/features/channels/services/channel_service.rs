use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::channels::models::Channel;
use crate::features::channels::repositories::ChannelRepository;

/// Service for resolving the channel a request runs in
pub struct ChannelService {
    repository: Arc<dyn ChannelRepository>,
    default_channel_code: String,
}

impl ChannelService {
    pub fn new(repository: Arc<dyn ChannelRepository>, default_channel_code: String) -> Self {
        Self {
            repository,
            default_channel_code,
        }
    }

    /// Resolve the channel for a request token, or the default channel when
    /// no token was sent
    pub async fn resolve(&self, token: Option<&str>) -> Result<Channel> {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => self
                .repository
                .find_by_token(token)
                .await?
                .ok_or_else(|| AppError::NotFound("No channel matches the given token".to_string())),
            None => self.get_default().await,
        }
    }

    pub async fn get_default(&self) -> Result<Channel> {
        self.repository
            .find_by_code(&self.default_channel_code)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Default channel '{}' does not exist",
                    self.default_channel_code
                ))
            })
    }

    pub async fn list(&self) -> Result<Vec<Channel>> {
        self.repository.list().await
    }
}
