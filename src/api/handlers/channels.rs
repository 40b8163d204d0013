use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::CurrentUser;
use crate::models::ChannelResponse;
use crate::services::video_service::CreateChannelRequest;
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

#[utoipa::path(
    post,
    path = "/channels",
    request_body = CreateChannelRequest,
    responses(
        (status = 201, description = "Channel created", body = ChannelResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "channels"
)]
pub async fn create_channel(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateChannelRequest>,
) -> Result<(StatusCode, Json<ChannelResponse>), AppError> {
    let channel = state.videos.create_channel(user.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(ChannelResponse::from(&channel))))
}

#[utoipa::path(
    get,
    path = "/channels",
    responses(
        (status = 200, description = "Channels owned by the caller", body = Vec<ChannelResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "channels"
)]
pub async fn list_channels(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<ChannelResponse>>, AppError> {
    let channels = state.videos.channels_for_user(user.id()).await?;
    Ok(Json(channels.iter().map(ChannelResponse::from).collect()))
}
