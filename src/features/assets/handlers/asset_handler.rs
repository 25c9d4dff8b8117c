use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::assets::dtos::{AssetResponseDto, CreateAssetDto};
use crate::features::assets::routes::AssetsState;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List assets, newest first
#[utoipa::path(
    get,
    path = "/api/assets",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of assets", body = ApiResponse<Vec<AssetResponseDto>>),
    ),
    tag = "assets"
)]
pub async fn list_assets(
    State(state): State<AssetsState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AssetResponseDto>>>> {
    let (assets, total) = state
        .service
        .list(pagination.limit(), pagination.offset())
        .await?;
    let dtos: Vec<AssetResponseDto> = assets.into_iter().map(Into::into).collect();
    let dtos = state.codec.encode(dtos)?;
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get asset by id
#[utoipa::path(
    get,
    path = "/api/assets/{id}",
    params(
        ("id" = String, Path, description = "Asset id")
    ),
    responses(
        (status = 200, description = "Asset found", body = ApiResponse<AssetResponseDto>),
        (status = 404, description = "Asset not found")
    ),
    tag = "assets"
)]
pub async fn get_asset(
    State(state): State<AssetsState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AssetResponseDto>>> {
    let id = state.codec.decode_id(&id)?;
    let asset = state.service.find_one(id).await?;
    let dto = state.codec.encode(AssetResponseDto::from(asset))?;
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Register an asset
#[utoipa::path(
    post,
    path = "/api/assets",
    request_body = CreateAssetDto,
    responses(
        (status = 201, description = "Asset created", body = ApiResponse<AssetResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "assets"
)]
pub async fn create_asset(
    State(state): State<AssetsState>,
    AppJson(dto): AppJson<CreateAssetDto>,
) -> Result<(StatusCode, Json<ApiResponse<AssetResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let asset = state.service.create(dto.into()).await?;
    let dto = state.codec.encode(AssetResponseDto::from(asset))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(dto),
            Some("Asset created".to_string()),
            None,
        )),
    ))
}
