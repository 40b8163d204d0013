use super::client_ip;
use crate::AppState;
use crate::api::error::AppError;
use crate::models::UserResponse;
use crate::services::account_service::LoginResponse;
use crate::utils::validation::{LoginForm, RegistrationForm};
use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
};
use std::net::SocketAddr;

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegistrationForm,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Field errors, e.g. username or email already taken")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    Json(form): Json<RegistrationForm>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let ip = client_ip(&headers, peer.as_ref());
    let user = state.accounts.register(form, ip.as_deref()).await?;
    let profile = state.accounts.profile(&user).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid Username or Password"),
        (status = 403, description = "Account is disabled")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    Json(form): Json<LoginForm>,
) -> Result<Json<LoginResponse>, AppError> {
    let ip = client_ip(&headers, peer.as_ref());
    Ok(Json(state.accounts.login(&form, ip.as_deref()).await?))
}
