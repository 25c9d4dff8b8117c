mod category_service;
pub mod category_tree;
mod root_cache;

pub use category_service::*;
pub use root_cache::*;
