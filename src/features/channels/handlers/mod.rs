mod channel_handler;

pub use channel_handler::*;
