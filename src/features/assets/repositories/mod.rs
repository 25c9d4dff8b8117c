mod asset_repository;
#[cfg(test)]
pub mod memory;

pub use asset_repository::*;
