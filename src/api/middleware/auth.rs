use crate::AppState;
use crate::api::error::AppError;
use crate::entities::user;
use crate::utils::auth::validate_jwt;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

#[derive(Deserialize)]
struct AuthQuery {
    token: Option<String>,
}

/// The account behind a verified bearer token.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub user::Model);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    let token = if let Some(t) = auth_header {
        Some(t)
    } else {
        // Try query parameter
        let query = req.uri().query().unwrap_or_default();
        serde_urlencoded::from_str::<AuthQuery>(query)
            .ok()
            .and_then(|q| q.token)
    };

    let Some(token) = token else {
        return Err(AppError::Unauthorized("Missing token".to_string()));
    };

    let claims = validate_jwt(&token, &state.config.jwt_secret).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AppError::Unauthorized("Invalid token".to_string())
    })?;

    // Rotated fs_uniquifier or deleted account means the token is dead
    let account = state.accounts.verify_session(&claims).await?;

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(CurrentUser(account));
    Ok(next.run(req).await)
}
