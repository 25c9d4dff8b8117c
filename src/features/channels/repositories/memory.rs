use async_trait::async_trait;
use std::sync::Mutex;

use crate::core::error::Result;
use crate::features::channels::models::Channel;
use crate::features::channels::repositories::ChannelRepository;

/// Channel store backed by a vector, for tests
#[derive(Default)]
pub struct MemoryChannelRepository {
    channels: Mutex<Vec<Channel>>,
}

impl MemoryChannelRepository {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self {
            channels: Mutex::new(channels),
        }
    }
}

#[async_trait]
impl ChannelRepository for MemoryChannelRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<Channel>> {
        let channels = self.channels.lock().unwrap();
        Ok(channels.iter().find(|c| c.token == token).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Channel>> {
        let channels = self.channels.lock().unwrap();
        Ok(channels.iter().find(|c| c.code == code).cloned())
    }

    async fn list(&self) -> Result<Vec<Channel>> {
        let mut channels = self.channels.lock().unwrap().clone();
        channels.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(channels)
    }
}
