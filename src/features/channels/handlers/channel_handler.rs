use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::channels::dtos::ChannelResponseDto;
use crate::features::channels::routes::ChannelsState;
use crate::features::channels::RequestContext;
use crate::shared::types::{ApiResponse, Meta};

/// List all channels
#[utoipa::path(
    get,
    path = "/api/channels",
    responses(
        (status = 200, description = "List of channels", body = ApiResponse<Vec<ChannelResponseDto>>),
    ),
    tag = "channels"
)]
pub async fn list_channels(
    State(state): State<ChannelsState>,
) -> Result<Json<ApiResponse<Vec<ChannelResponseDto>>>> {
    let channels = state.service.list().await?;
    let total = channels.len() as i64;
    let dtos: Vec<ChannelResponseDto> = channels.into_iter().map(Into::into).collect();
    let dtos = state.codec.encode(dtos)?;
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get the channel of the current request
#[utoipa::path(
    get,
    path = "/api/channels/active",
    params(
        ("x-channel-token" = Option<String>, Header, description = "Channel token, default channel when absent")
    ),
    responses(
        (status = 200, description = "Active channel", body = ApiResponse<ChannelResponseDto>),
        (status = 404, description = "Unknown channel token")
    ),
    tag = "channels"
)]
pub async fn get_active_channel(
    State(state): State<ChannelsState>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<ChannelResponseDto>>> {
    let dto = state.codec.encode(ChannelResponseDto::from(ctx.channel))?;
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}
