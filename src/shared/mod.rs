pub mod constants;
pub mod events;
pub mod id_codec;
#[cfg(test)]
pub mod test_helpers;
pub mod translation;
pub mod types;
pub mod validation;
