use super::client_ip;
use crate::AppState;
use crate::api::error::AppError;
use crate::models::format_timestamp;
use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GuestRequest {
    /// Previously issued guest UUID; omitted on first visit.
    pub uuid: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestResponse {
    pub uuid: Option<String>,
    pub last_active_at: Option<String>,
}

#[utoipa::path(
    post,
    path = "/guests",
    request_body = GuestRequest,
    responses(
        (status = 200, description = "Guest created or refreshed", body = GuestResponse)
    ),
    tag = "guests"
)]
pub async fn touch_guest(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    Json(payload): Json<GuestRequest>,
) -> Result<Json<GuestResponse>, AppError> {
    let ip = client_ip(&headers, peer.as_ref());
    let guest = state
        .accounts
        .touch_guest(payload.uuid.as_deref(), ip.as_deref())
        .await?;

    Ok(Json(GuestResponse {
        uuid: guest.guest_uuid,
        last_active_at: guest.last_active_at.as_ref().map(format_timestamp),
    }))
}
