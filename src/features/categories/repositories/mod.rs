mod category_repository;
#[cfg(test)]
pub mod memory;
mod pg_category_repository;

pub use category_repository::*;
pub use pg_category_repository::*;
