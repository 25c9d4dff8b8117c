pub mod assets;
pub mod categories;
pub mod channels;
