//! Category tree of the catalog.
//!
//! Each channel has one synthetic root category, created on first access.
//! Every other category hangs below it and is ordered among its siblings
//! by a zero-based, contiguous `position`.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/categories` | List categories (paginated, by position) |
//! | GET | `/api/categories/tree` | Nested tree below the root or `root_id` |
//! | GET | `/api/categories/next-position` | Next free position under a parent |
//! | GET | `/api/categories/{id}` | Get category with its assets |
//! | POST | `/api/categories` | Create a category |
//! | PUT | `/api/categories/{id}` | Update translations and assets |
//! | POST | `/api/categories/{id}/move` | Move to a parent and index |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::CategoryService;
