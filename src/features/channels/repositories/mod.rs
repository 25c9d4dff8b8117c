mod channel_repository;
#[cfg(test)]
pub mod memory;

pub use channel_repository::*;
