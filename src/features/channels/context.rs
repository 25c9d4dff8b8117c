use uuid::Uuid;

use crate::features::channels::models::Channel;

/// Channel and language a request is served in.
///
/// Inserted into request extensions by
/// [`request_context_middleware`](crate::core::middleware::request_context_middleware).
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub channel: Channel,
    pub language_code: String,
}

impl RequestContext {
    pub fn new(channel: Channel, language_code: Option<String>) -> Self {
        let language_code =
            language_code.unwrap_or_else(|| channel.default_language_code.clone());
        Self {
            channel,
            language_code,
        }
    }

    pub fn channel_id(&self) -> Uuid {
        self.channel.id
    }

    pub fn channel_code(&self) -> &str {
        &self.channel.code
    }

    pub fn default_language_code(&self) -> &str {
        &self.channel.default_language_code
    }
}
