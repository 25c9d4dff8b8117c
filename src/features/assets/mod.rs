//! Media assets referenced by catalog entities.
//!
//! Only asset metadata is stored here; binaries live with the storage provider
//! behind `source`.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/assets` | List assets (paginated) |
//! | GET | `/api/assets/{id}` | Get asset by id |
//! | POST | `/api/assets` | Register an asset |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::AssetService;
