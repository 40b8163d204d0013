use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::CurrentUser;
use crate::models::{ClipResponse, CommentResponse, TagResponse, UpvoteResponse, VideoResponse};
use crate::services::video_service::{
    CommentRequest, CreateClipRequest, CreateVideoRequest, TagRequest,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

#[utoipa::path(
    post,
    path = "/videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Video recorded", body = VideoResponse),
        (status = 403, description = "Channel belongs to another user"),
        (status = 404, description = "Channel not found")
    ),
    security(("jwt" = [])),
    tag = "videos"
)]
pub async fn create_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<VideoResponse>), AppError> {
    let video = state.videos.create_video(user.id(), payload).await?;
    let body = state.videos.serialize_video(&video).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(
    get,
    path = "/videos/{id}",
    params(("id" = i32, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video", body = VideoResponse),
        (status = 404, description = "Video not found")
    ),
    tag = "videos"
)]
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VideoResponse>, AppError> {
    let video = state.videos.get_video(id).await?;
    Ok(Json(state.videos.serialize_video(&video).await?))
}

#[utoipa::path(
    delete,
    path = "/videos/{id}",
    params(("id" = i32, Path, description = "Video id")),
    responses(
        (status = 204, description = "Video and its media deleted"),
        (status = 403, description = "Video belongs to another user"),
        (status = 404, description = "Video not found")
    ),
    security(("jwt" = [])),
    tag = "videos"
)]
pub async fn delete_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.videos.delete_video(user.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/videos/{id}/tags",
    params(("id" = i32, Path, description = "Video id")),
    responses((status = 200, description = "Tags on the video", body = Vec<TagResponse>)),
    tag = "videos"
)]
pub async fn list_video_tags(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = state.videos.video_tags(id).await?;
    Ok(Json(tags.iter().map(TagResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/videos/{id}/tags",
    params(("id" = i32, Path, description = "Video id")),
    request_body = TagRequest,
    responses(
        (status = 201, description = "Tag added", body = TagResponse),
        (status = 403, description = "Video belongs to another user"),
        (status = 409, description = "Video already carries this tag")
    ),
    security(("jwt" = [])),
    tag = "videos"
)]
pub async fn add_video_tag(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<TagRequest>,
) -> Result<(StatusCode, Json<TagResponse>), AppError> {
    let tag = state
        .videos
        .add_video_tag(user.id(), id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(TagResponse::from(&tag))))
}

#[utoipa::path(
    delete,
    path = "/videos/{id}/tags/{tag_id}",
    params(
        ("id" = i32, Path, description = "Video id"),
        ("tag_id" = i32, Path, description = "Tag id")
    ),
    responses(
        (status = 204, description = "Tag removed"),
        (status = 404, description = "Tag not found")
    ),
    security(("jwt" = [])),
    tag = "videos"
)]
pub async fn remove_video_tag(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, tag_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    state.videos.remove_video_tag(user.id(), id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/videos/{id}/upvote",
    params(("id" = i32, Path, description = "Video id")),
    responses((status = 200, description = "Upvote toggled", body = UpvoteResponse)),
    security(("jwt" = [])),
    tag = "videos"
)]
pub async fn toggle_video_upvote(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<UpvoteResponse>, AppError> {
    let (upvoted, upvotes) = state.videos.toggle_video_upvote(user.id(), id).await?;
    Ok(Json(UpvoteResponse { upvoted, upvotes }))
}

#[utoipa::path(
    get,
    path = "/videos/{id}/comments",
    params(("id" = i32, Path, description = "Video id")),
    responses((status = 200, description = "Comments, oldest first", body = Vec<CommentResponse>)),
    tag = "videos"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let comments = state.videos.comments(id).await?;
    Ok(Json(comments.iter().map(CommentResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/videos/{id}/comments",
    params(("id" = i32, Path, description = "Video id")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment posted", body = CommentResponse),
        (status = 403, description = "Comments are disabled for this video")
    ),
    security(("jwt" = [])),
    tag = "videos"
)]
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    let comment = state
        .videos
        .add_comment(user.id(), id, &payload.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(CommentResponse::from(&comment))))
}

#[utoipa::path(
    post,
    path = "/videos/{id}/clips",
    params(("id" = i32, Path, description = "Parent video id")),
    request_body = CreateClipRequest,
    responses(
        (status = 201, description = "Clip created", body = ClipResponse),
        (status = 400, description = "Invalid clip bounds"),
        (status = 403, description = "Video belongs to another user")
    ),
    security(("jwt" = [])),
    tag = "clips"
)]
pub async fn create_clip(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<CreateClipRequest>,
) -> Result<(StatusCode, Json<ClipResponse>), AppError> {
    let clip = state.videos.create_clip(user.id(), id, payload).await?;
    Ok((StatusCode::CREATED, Json(state.videos.serialize_clip(&clip))))
}
