//! Entity id encoding at the API boundary.
//!
//! Services work with database UUIDs only. Ids leave the API through
//! [`IdCodec::encode`] and enter through [`IdCodec::decode`], which walk the
//! ids of a DTO via the [`EntityIds`] visitor. DTOs list their own id fields,
//! so only fields that really hold entity ids are touched.

use base64::prelude::*;
use uuid::Uuid;

use crate::core::config::EntityIdStrategyKind;
use crate::core::error::{AppError, Result};

/// Converts between database ids and the ids seen by API clients.
pub trait EntityIdStrategy: Send + Sync {
    fn encode_id(&self, id: Uuid) -> String;
    fn decode_id(&self, raw: &str) -> Result<Uuid>;
}

/// Exposes ids as hyphenated UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainIdStrategy;

impl EntityIdStrategy for PlainIdStrategy {
    fn encode_id(&self, id: Uuid) -> String {
        id.hyphenated().to_string()
    }

    fn decode_id(&self, raw: &str) -> Result<Uuid> {
        Uuid::parse_str(raw.trim()).map_err(|_| invalid_id(raw))
    }
}

/// Exposes ids as URL-safe base64 (22 chars, no padding).
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64IdStrategy;

impl EntityIdStrategy for Base64IdStrategy {
    fn encode_id(&self, id: Uuid) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(id.as_bytes())
    }

    fn decode_id(&self, raw: &str) -> Result<Uuid> {
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(raw.trim())
            .map_err(|_| invalid_id(raw))?;
        Uuid::from_slice(&bytes).map_err(|_| invalid_id(raw))
    }
}

fn invalid_id(raw: &str) -> AppError {
    AppError::BadRequest(format!("Invalid id '{}'", raw))
}

/// Parse an id that has already been through [`IdCodec::decode`].
pub fn parse_decoded_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| invalid_id(raw))
}

/// A value that carries entity ids.
///
/// Implemented for the scalar id (`String`), for `Option` and `Vec` of id
/// carriers, and by each DTO record for the fields that hold ids.
pub trait EntityIds {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()>;
}

impl EntityIds for String {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()> {
        visit(self)
    }
}

impl<T: EntityIds> EntityIds for Option<T> {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()> {
        match self {
            Some(inner) => inner.visit_ids(visit),
            None => Ok(()),
        }
    }
}

impl<T: EntityIds> EntityIds for Vec<T> {
    fn visit_ids(&mut self, visit: &mut dyn FnMut(&mut String) -> Result<()>) -> Result<()> {
        for item in self.iter_mut() {
            item.visit_ids(visit)?;
        }
        Ok(())
    }
}

pub struct IdCodec {
    strategy: Box<dyn EntityIdStrategy>,
}

impl std::fmt::Debug for IdCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdCodec").finish_non_exhaustive()
    }
}

impl IdCodec {
    pub fn new(kind: EntityIdStrategyKind) -> Self {
        match kind {
            EntityIdStrategyKind::Plain => Self::with_strategy(PlainIdStrategy),
            EntityIdStrategyKind::Base64 => Self::with_strategy(Base64IdStrategy),
        }
    }

    pub fn with_strategy(strategy: impl EntityIdStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    pub fn encode_id(&self, id: Uuid) -> String {
        self.strategy.encode_id(id)
    }

    pub fn decode_id(&self, raw: &str) -> Result<Uuid> {
        self.strategy.decode_id(raw)
    }

    /// Encode every id in `target`. Ids must be hyphenated database UUIDs.
    pub fn encode<T: EntityIds>(&self, mut target: T) -> Result<T> {
        target.visit_ids(&mut |id: &mut String| {
            let uuid = Uuid::parse_str(id).map_err(|_| {
                AppError::Internal(format!("Response carries a malformed id '{}'", id))
            })?;
            *id = self.strategy.encode_id(uuid);
            Ok(())
        })?;
        Ok(target)
    }

    /// Decode every client id in `target` into hyphenated database UUIDs.
    pub fn decode<T: EntityIds>(&self, mut target: T) -> Result<T> {
        target.visit_ids(&mut |id: &mut String| {
            *id = self.strategy.decode_id(id)?.hyphenated().to_string();
            Ok(())
        })?;
        Ok(target)
    }
}
