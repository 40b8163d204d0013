use crate::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

/// Public settings the front-end needs before anyone signs in.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfigResponse {
    pub recaptcha_enabled: bool,
    pub recaptcha_site_key: Option<String>,
}

#[utoipa::path(
    get,
    path = "/site-config",
    responses(
        (status = 200, description = "Public client settings", body = SiteConfigResponse)
    ),
    tag = "system"
)]
pub async fn site_config(State(state): State<AppState>) -> Json<SiteConfigResponse> {
    Json(SiteConfigResponse {
        recaptcha_enabled: state.accounts.captcha_required(),
        recaptcha_site_key: state.accounts.recaptcha_site_key().map(str::to_string),
    })
}
