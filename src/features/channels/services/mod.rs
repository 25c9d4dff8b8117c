mod channel_service;

pub use channel_service::*;
