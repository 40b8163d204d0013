use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub media: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = if state.db.ping().await.is_ok() {
        "connected"
    } else {
        "disconnected"
    };

    let media_status = match tokio::fs::try_exists(state.media.videos_root()).await {
        Ok(true) => "available",
        _ => "missing",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database: db_status.to_string(),
        media: media_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
