/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// CATEGORY TREE
// =============================================================================

/// Name given to the synthetic root category of every channel
pub const ROOT_CATEGORY_NAME: &str = "__root_category__";

/// Slug of the synthetic root category
pub const ROOT_CATEGORY_SLUG: &str = "root";

/// Description stored on the root category translation
pub const ROOT_CATEGORY_DESCRIPTION: &str = "The root of the category tree.";

// =============================================================================
// REQUEST CONTEXT
// =============================================================================

/// Header carrying the channel token of the storefront/tenant
pub const CHANNEL_TOKEN_HEADER: &str = "x-channel-token";
