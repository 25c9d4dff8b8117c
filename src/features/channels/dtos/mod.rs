mod channel_dto;

pub use channel_dto::*;
