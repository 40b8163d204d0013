use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::CurrentUser;
use crate::models::{ClipResponse, TagResponse, UpvoteResponse};
use crate::services::video_service::TagRequest;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/clips/{id}",
    params(("id" = i32, Path, description = "Clip id")),
    responses(
        (status = 200, description = "Clip", body = ClipResponse),
        (status = 404, description = "Clip not found")
    ),
    tag = "clips"
)]
pub async fn get_clip(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ClipResponse>, AppError> {
    let clip = state.videos.get_clip(id).await?;
    Ok(Json(state.videos.serialize_clip(&clip)))
}

#[utoipa::path(
    delete,
    path = "/clips/{id}",
    params(("id" = i32, Path, description = "Clip id")),
    responses(
        (status = 204, description = "Clip and its media deleted"),
        (status = 403, description = "Clip belongs to another user")
    ),
    security(("jwt" = [])),
    tag = "clips"
)]
pub async fn delete_clip(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.videos.delete_clip(user.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/clips/{id}/tags",
    params(("id" = i32, Path, description = "Clip id")),
    responses((status = 200, description = "Tags on the clip", body = Vec<TagResponse>)),
    tag = "clips"
)]
pub async fn list_clip_tags(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = state.videos.clip_tags(id).await?;
    Ok(Json(tags.iter().map(TagResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/clips/{id}/tags",
    params(("id" = i32, Path, description = "Clip id")),
    request_body = TagRequest,
    responses(
        (status = 201, description = "Tag added", body = TagResponse),
        (status = 409, description = "Clip already carries this tag")
    ),
    security(("jwt" = [])),
    tag = "clips"
)]
pub async fn add_clip_tag(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<TagRequest>,
) -> Result<(StatusCode, Json<TagResponse>), AppError> {
    let tag = state.videos.add_clip_tag(user.id(), id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(TagResponse::from(&tag))))
}

#[utoipa::path(
    post,
    path = "/clips/{id}/upvote",
    params(("id" = i32, Path, description = "Clip id")),
    responses((status = 200, description = "Upvote toggled", body = UpvoteResponse)),
    security(("jwt" = [])),
    tag = "clips"
)]
pub async fn toggle_clip_upvote(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<UpvoteResponse>, AppError> {
    let (upvoted, upvotes) = state.videos.toggle_clip_upvote(user.id(), id).await?;
    Ok(Json(UpvoteResponse { upvoted, upvotes }))
}
