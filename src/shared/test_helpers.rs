//! Fixtures shared by unit and router tests.

use chrono::Utc;
use uuid::Uuid;

use crate::features::channels::models::Channel;
use crate::features::channels::RequestContext;

/// Channel with token `{code}-token` and English as default language
pub fn channel(code: &str) -> Channel {
    Channel {
        id: Uuid::new_v4(),
        code: code.to_string(),
        token: format!("{code}-token"),
        default_language_code: "en".to_string(),
        created_at: Utc::now(),
    }
}

/// Request context in `channel`, in the given language or the channel default
pub fn context(channel: &Channel, language_code: Option<&str>) -> RequestContext {
    RequestContext::new(channel.clone(), language_code.map(str::to_string))
}
