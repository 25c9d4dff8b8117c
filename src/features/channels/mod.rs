//! Sales channels (tenants/storefronts).
//!
//! Every request runs in the scope of one channel, resolved from the
//! `x-channel-token` header by
//! [`request_context_middleware`](crate::core::middleware::request_context_middleware).
//! Requests without a token use the default channel.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/channels` | List all channels |
//! | GET | `/api/channels/active` | Channel of the current request |

pub mod context;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use context::RequestContext;
pub use services::ChannelService;
