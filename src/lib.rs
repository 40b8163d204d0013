pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::api::middleware::request_id::{REQUEST_ID_HEADER, request_id_middleware};
use crate::config::AppConfig;
use crate::services::account_service::AccountService;
use crate::services::email_check::EmailDeliverability;
use crate::services::media_store::MediaStore;
use crate::services::recaptcha::CaptchaVerifier;
use crate::services::video_service::VideoService;
use axum::{
    Router,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::site::site_config,
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::guests::touch_guest,
        api::handlers::channels::create_channel,
        api::handlers::channels::list_channels,
        api::handlers::videos::create_video,
        api::handlers::videos::get_video,
        api::handlers::videos::delete_video,
        api::handlers::videos::list_video_tags,
        api::handlers::videos::add_video_tag,
        api::handlers::videos::remove_video_tag,
        api::handlers::videos::toggle_video_upvote,
        api::handlers::videos::list_comments,
        api::handlers::videos::add_comment,
        api::handlers::videos::create_clip,
        api::handlers::clips::get_clip,
        api::handlers::clips::delete_clip,
        api::handlers::clips::list_clip_tags,
        api::handlers::clips::add_clip_tag,
        api::handlers::clips::toggle_clip_upvote,
        api::handlers::users::get_me,
        api::handlers::users::get_profile,
        api::handlers::users::list_socials,
        api::handlers::users::add_social,
        api::handlers::users::remove_social,
        api::handlers::users::request_deletion,
        api::handlers::users::cancel_deletion,
        api::handlers::users::revoke_sessions,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::handlers::site::SiteConfigResponse,
            api::handlers::guests::GuestRequest,
            api::handlers::guests::GuestResponse,
            api::handlers::users::DeletionResponse,
            utils::validation::RegistrationForm,
            utils::validation::LoginForm,
            services::account_service::LoginResponse,
            services::account_service::SocialRequest,
            services::video_service::CreateChannelRequest,
            services::video_service::CreateVideoRequest,
            services::video_service::CreateClipRequest,
            services::video_service::TagRequest,
            services::video_service::CommentRequest,
            models::VideoResponse,
            models::ClipResponse,
            models::UserResponse,
            models::AccountResponse,
            models::SocialResponse,
            models::ChannelResponse,
            models::TagResponse,
            models::CommentResponse,
            models::UpvoteResponse,
        )
    ),
    tags(
        (name = "system", description = "Health and public client settings"),
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Accounts and profiles"),
        (name = "guests", description = "Anonymous visitor tracking"),
        (name = "channels", description = "Channels owning videos and clips"),
        (name = "videos", description = "Recorded videos"),
        (name = "clips", description = "Clips cut from recorded videos")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub media: MediaStore,
    pub accounts: Arc<AccountService>,
    pub videos: Arc<VideoService>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: AppConfig,
        email_checker: Arc<dyn EmailDeliverability>,
        captcha: Option<Arc<dyn CaptchaVerifier>>,
    ) -> Self {
        let media = MediaStore::new(config.videos_root());

        let accounts = Arc::new(AccountService::new(
            db.clone(),
            config.clone(),
            media.clone(),
            email_checker,
            captcha,
        ));
        let videos = Arc::new(VideoService::new(db.clone(), media.clone()));

        Self {
            db,
            config,
            media,
            accounts,
            videos,
        }
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(state: AppState) -> Router {
    let auth = from_fn_with_state(state.clone(), api::middleware::auth::auth_middleware);

    // Sits inside the request-id layer, so the span sees the final id
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            tracing::info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                tracing::info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/site-config", get(api::handlers::site::site_config))
        .route("/register", post(api::handlers::auth::register))
        .route("/login", post(api::handlers::auth::login))
        .route("/guests", post(api::handlers::guests::touch_guest))
        .route(
            "/channels",
            get(api::handlers::channels::list_channels)
                .post(api::handlers::channels::create_channel)
                .layer(auth.clone()),
        )
        .route(
            "/videos",
            post(api::handlers::videos::create_video).layer(auth.clone()),
        )
        .route(
            "/videos/:id",
            get(api::handlers::videos::get_video)
                .merge(delete(api::handlers::videos::delete_video).layer(auth.clone())),
        )
        .route(
            "/videos/:id/tags",
            get(api::handlers::videos::list_video_tags)
                .merge(post(api::handlers::videos::add_video_tag).layer(auth.clone())),
        )
        .route(
            "/videos/:id/tags/:tag_id",
            delete(api::handlers::videos::remove_video_tag).layer(auth.clone()),
        )
        .route(
            "/videos/:id/upvote",
            post(api::handlers::videos::toggle_video_upvote).layer(auth.clone()),
        )
        .route(
            "/videos/:id/comments",
            get(api::handlers::videos::list_comments)
                .merge(post(api::handlers::videos::add_comment).layer(auth.clone())),
        )
        .route(
            "/videos/:id/clips",
            post(api::handlers::videos::create_clip).layer(auth.clone()),
        )
        .route(
            "/clips/:id",
            get(api::handlers::clips::get_clip)
                .merge(delete(api::handlers::clips::delete_clip).layer(auth.clone())),
        )
        .route(
            "/clips/:id/tags",
            get(api::handlers::clips::list_clip_tags)
                .merge(post(api::handlers::clips::add_clip_tag).layer(auth.clone())),
        )
        .route(
            "/clips/:id/upvote",
            post(api::handlers::clips::toggle_clip_upvote).layer(auth.clone()),
        )
        .route(
            "/users/me",
            get(api::handlers::users::get_me).layer(auth.clone()),
        )
        .route(
            "/users/me/socials",
            get(api::handlers::users::list_socials)
                .post(api::handlers::users::add_social)
                .layer(auth.clone()),
        )
        .route(
            "/users/me/socials/:id",
            delete(api::handlers::users::remove_social).layer(auth.clone()),
        )
        .route(
            "/users/me/deletion",
            post(api::handlers::users::request_deletion)
                .delete(api::handlers::users::cancel_deletion)
                .layer(auth.clone()),
        )
        .route(
            "/users/me/sessions/revoke",
            post(api::handlers::users::revoke_sessions).layer(auth),
        )
        .route("/users/:username", get(api::handlers::users::get_profile))
        .layer(trace_layer)
        .layer(from_fn(request_id_middleware))
        .layer(cors_layer(&state.config))
        .with_state(state)
}
