use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::assets::{dtos as assets_dtos, handlers as assets_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::channels::{dtos as channels_dtos, handlers as channels_handlers};
use crate::shared::constants::CHANNEL_TOKEN_HEADER;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category_tree,
        categories_handlers::get_next_position,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::move_category,
        // Channels
        channels_handlers::list_channels,
        channels_handlers::get_active_channel,
        // Assets
        assets_handlers::list_assets,
        assets_handlers::get_asset,
        assets_handlers::create_asset,
    ),
    components(
        schemas(
            Meta,
            // Categories
            categories_dtos::CategoryTranslationInputDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::MoveCategoryDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryDetailDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::NextPositionDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryDetailDto>,
            ApiResponse<categories_dtos::CategoryTreeDto>,
            ApiResponse<categories_dtos::NextPositionDto>,
            // Channels
            channels_dtos::ChannelResponseDto,
            ApiResponse<Vec<channels_dtos::ChannelResponseDto>>,
            ApiResponse<channels_dtos::ChannelResponseDto>,
            // Assets
            assets_dtos::CreateAssetDto,
            assets_dtos::AssetResponseDto,
            ApiResponse<Vec<assets_dtos::AssetResponseDto>>,
            ApiResponse<assets_dtos::AssetResponseDto>,
        )
    ),
    tags(
        (name = "categories", description = "Category tree: queries, creation, updates and moves"),
        (name = "channels", description = "Sales channels"),
        (name = "assets", description = "Media asset metadata"),
    ),
    modifiers(&ChannelTokenAddon),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Back-office API for the product catalog",
    )
)]
pub struct ApiDoc;

/// Documents the channel token header as an API key scheme
struct ChannelTokenAddon;

impl Modify for ChannelTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "channel_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(CHANNEL_TOKEN_HEADER))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_catalog_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/categories",
            "/api/categories/tree",
            "/api/categories/{id}/move",
            "/api/channels/active",
            "/api/assets/{id}",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected}"
            );
        }
        assert!(doc
            .components
            .unwrap()
            .security_schemes
            .contains_key("channel_token"));
    }
}
