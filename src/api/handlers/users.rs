use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::CurrentUser;
use crate::models::{AccountResponse, SocialResponse, UserResponse, format_timestamp};
use crate::services::account_service::SocialRequest;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletionResponse {
    pub scheduled_at: Option<String>,
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Own account", body = AccountResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<AccountResponse>, AppError> {
    Ok(Json(state.accounts.account(&user.0).await?))
}

#[utoipa::path(
    get,
    path = "/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Public profile", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.accounts.find_by_username(&username).await?;
    Ok(Json(state.accounts.profile(&user).await?))
}

#[utoipa::path(
    get,
    path = "/users/me/socials",
    responses((status = 200, description = "Social links", body = Vec<SocialResponse>)),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn list_socials(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<SocialResponse>>, AppError> {
    let socials = state.accounts.socials(user.id()).await?;
    Ok(Json(socials.iter().map(SocialResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/users/me/socials",
    request_body = SocialRequest,
    responses(
        (status = 201, description = "Social link added", body = SocialResponse),
        (status = 400, description = "Invalid social link")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn add_social(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SocialRequest>,
) -> Result<(StatusCode, Json<SocialResponse>), AppError> {
    let social = state.accounts.add_social(user.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(SocialResponse::from(&social))))
}

#[utoipa::path(
    delete,
    path = "/users/me/socials/{id}",
    params(("id" = i32, Path, description = "Social link id")),
    responses(
        (status = 204, description = "Social link removed"),
        (status = 404, description = "Social link not found")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn remove_social(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.accounts.remove_social(user.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/users/me/deletion",
    responses((status = 200, description = "Account scheduled for deletion", body = DeletionResponse)),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn request_deletion(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<DeletionResponse>, AppError> {
    let flag = state.accounts.flag_for_deletion(user.id()).await?;
    Ok(Json(DeletionResponse {
        scheduled_at: flag.timestamp.as_ref().map(format_timestamp),
    }))
}

#[utoipa::path(
    delete,
    path = "/users/me/deletion",
    responses(
        (status = 204, description = "Pending deletion cancelled"),
        (status = 404, description = "No deletion pending")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn cancel_deletion(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    if state.accounts.cancel_deletion(user.id()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("No deletion pending".to_string()))
    }
}

#[utoipa::path(
    post,
    path = "/users/me/sessions/revoke",
    responses((status = 204, description = "Every issued token is now invalid")),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn revoke_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    state.accounts.revoke_sessions(user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
