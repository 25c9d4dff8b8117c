use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::categories::dtos::{
    CategoryDetailDto, CategoryResponseDto, CategoryTreeDto, CreateCategoryDto, MoveCategoryDto,
    NextPositionDto, NextPositionQuery, TreeQuery, UpdateCategoryDto,
};
use crate::features::categories::models::{CreateCategoryInput, UpdateCategoryInput};
use crate::features::categories::routes::CategoriesState;
use crate::features::channels::RequestContext;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List categories of the active channel, ordered by position
#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        PaginationQuery,
        ("languageCode" = Option<String>, Query, description = "Language of translated fields")
    ),
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<CategoriesState>,
    ctx: RequestContext,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let (categories, total) = state
        .service
        .find_all(&ctx, pagination.limit(), pagination.offset())
        .await?;
    let dtos: Vec<CategoryResponseDto> = categories.into_iter().map(Into::into).collect();
    let dtos = state.codec.encode(dtos)?;
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get the category tree
///
/// Returns the subtree below `root_id`, or the whole tree of the channel.
#[utoipa::path(
    get,
    path = "/api/categories/tree",
    params(TreeQuery),
    responses(
        (status = 200, description = "Category tree", body = ApiResponse<CategoryTreeDto>),
        (status = 404, description = "Root category not found")
    ),
    tag = "categories"
)]
pub async fn get_category_tree(
    State(state): State<CategoriesState>,
    ctx: RequestContext,
    Query(query): Query<TreeQuery>,
) -> Result<Json<ApiResponse<CategoryTreeDto>>> {
    let root_id = query
        .root_id
        .as_deref()
        .map(|id| state.codec.decode_id(id))
        .transpose()?;
    let tree = state.service.get_tree(&ctx, root_id).await?;
    let dto = state.codec.encode(CategoryTreeDto::from(tree))?;
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Get the position the next child of a parent would receive
#[utoipa::path(
    get,
    path = "/api/categories/next-position",
    params(NextPositionQuery),
    responses(
        (status = 200, description = "Next free position", body = ApiResponse<NextPositionDto>),
        (status = 404, description = "Parent category not found")
    ),
    tag = "categories"
)]
pub async fn get_next_position(
    State(state): State<CategoriesState>,
    ctx: RequestContext,
    Query(query): Query<NextPositionQuery>,
) -> Result<Json<ApiResponse<NextPositionDto>>> {
    let parent_id = query
        .parent_id
        .as_deref()
        .map(|id| state.codec.decode_id(id))
        .transpose()?;
    let position = state.service.next_position(&ctx, parent_id).await?;
    Ok(Json(ApiResponse::success(
        Some(NextPositionDto {
            parent_id: query.parent_id,
            position,
        }),
        None,
        None,
    )))
}

/// Get category by id
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryDetailDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<CategoriesState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CategoryDetailDto>>> {
    let id = state.codec.decode_id(&id)?;
    let detail = state.service.find_one(&ctx, id).await?;
    let dto = state.codec.encode(CategoryDetailDto::from(detail))?;
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Create a category
///
/// Appended after the last child of its parent.
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Parent category or asset not found")
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<CategoriesState>,
    ctx: RequestContext,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDetailDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let input: CreateCategoryInput = state.codec.decode(dto)?.try_into()?;
    let detail = state.service.create(&ctx, input).await?;
    let dto = state.codec.encode(CategoryDetailDto::from(detail))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(dto),
            Some("Category created".to_string()),
            None,
        )),
    ))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category id")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category or asset not found")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<CategoriesState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state.codec.decode_id(&id)?;
    let input: UpdateCategoryInput = state.codec.decode(dto)?.try_into()?;
    let detail = state.service.update(&ctx, id, input).await?;
    let dto = state.codec.encode(CategoryDetailDto::from(detail))?;
    Ok(Json(ApiResponse::success(
        Some(dto),
        Some("Category updated".to_string()),
        None,
    )))
}

/// Move a category
///
/// Places the category under `parent_id` at `index` among its new siblings
/// and renumbers the affected siblings.
#[utoipa::path(
    post,
    path = "/api/categories/{id}/move",
    params(
        ("id" = String, Path, description = "Category id")
    ),
    request_body = MoveCategoryDto,
    responses(
        (status = 200, description = "Category moved", body = ApiResponse<CategoryDetailDto>),
        (status = 404, description = "Category or parent not found"),
        (status = 409, description = "Concurrent move of the same category"),
        (status = 422, description = "Move would create a cycle or moves the root")
    ),
    tag = "categories"
)]
pub async fn move_category(
    State(state): State<CategoriesState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    AppJson(dto): AppJson<MoveCategoryDto>,
) -> Result<Json<ApiResponse<CategoryDetailDto>>> {
    let id = state.codec.decode_id(&id)?;
    let input = state.codec.decode(dto)?.into_input(id)?;
    let detail = state.service.move_category(&ctx, input).await?;
    let dto = state.codec.encode(CategoryDetailDto::from(detail))?;
    Ok(Json(ApiResponse::success(
        Some(dto),
        Some("Category moved".to_string()),
        None,
    )))
}
