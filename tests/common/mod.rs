#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
};
use http_body_util::BodyExt;
use osp_core::AppState;
use osp_core::config::AppConfig;
use osp_core::entities::{channel, recorded_video, user};
use osp_core::infrastructure::database;
use osp_core::services::email_check::{Deliverability, EmailDeliverability};
use osp_core::services::media_store::MediaStore;
use osp_core::services::video_service::{CreateChannelRequest, CreateVideoRequest};
use osp_core::utils::validation::{LoginForm, RegistrationForm};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const PASSWORD: &str = "password123";
pub const JWT_SECRET: &str = "test_secret";

/// Treats every `.invalid` domain as having no mail servers.
pub struct StubEmailChecker;

#[async_trait]
impl EmailDeliverability for StubEmailChecker {
    async fn check(&self, email: &str) -> Deliverability {
        if email.ends_with(".invalid") {
            Deliverability::Undeliverable {
                reason: "The domain name does not exist.".to_string(),
            }
        } else {
            Deliverability::Deliverable
        }
    }
}

pub struct TestContext {
    pub state: AppState,
    // Held so the media root outlives the test
    pub media_dir: TempDir,
}

impl TestContext {
    pub fn videos_root(&self) -> &Path {
        self.state.media.videos_root()
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }
}

pub async fn setup_test_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    database::run_migrations(&db).await.unwrap();
    database::seed_roles(&db).await.unwrap();
    db
}

pub async fn setup() -> TestContext {
    let db = setup_test_db().await;
    let media_dir = tempfile::tempdir().unwrap();

    let config = AppConfig {
        media_root: media_dir.path().to_path_buf(),
        jwt_secret: JWT_SECRET.to_string(),
        email_dns_check: false,
        ..AppConfig::default()
    };
    std::fs::create_dir_all(config.videos_root()).unwrap();

    let state = AppState::new(db, config, Arc::new(StubEmailChecker), None);
    TestContext { state, media_dir }
}

pub fn registration(username: &str, email: &str) -> RegistrationForm {
    RegistrationForm {
        username: username.to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        password_confirm: Some(PASSWORD.to_string()),
        recaptcha_response: None,
    }
}

pub fn login_form(identifier: &str, password: &str) -> LoginForm {
    LoginForm {
        email: identifier.to_string(),
        password: password.to_string(),
    }
}

pub async fn register_user(ctx: &TestContext, username: &str) -> user::Model {
    ctx.state
        .accounts
        .register(
            registration(username, &format!("{}@example.com", username)),
            None,
        )
        .await
        .unwrap()
}

pub async fn login_token(ctx: &TestContext, username: &str) -> String {
    ctx.state
        .accounts
        .login(&login_form(username, PASSWORD), Some("127.0.0.1"))
        .await
        .unwrap()
        .token
}

pub async fn create_channel(ctx: &TestContext, owner_id: i32) -> channel::Model {
    ctx.state
        .videos
        .create_channel(
            owner_id,
            CreateChannelRequest {
                channel_name: "Main".to_string(),
                topic: Some(3),
                description: None,
            },
        )
        .await
        .unwrap()
}

pub fn video_request(channel_id: i32) -> CreateVideoRequest {
    CreateVideoRequest {
        channel_id,
        video_name: Some("Friday stream".to_string()),
        topic: None,
        description: Some("recorded live".to_string()),
        length: Some(600.0),
        video_date: None,
        allow_comments: true,
        published: true,
    }
}

pub async fn create_video(
    ctx: &TestContext,
    owner_id: i32,
    channel_id: i32,
) -> recorded_video::Model {
    ctx.state
        .videos
        .create_video(owner_id, video_request(channel_id))
        .await
        .unwrap()
}

/// Writes a placeholder file under the videos root, creating parent dirs.
pub fn write_media(ctx: &TestContext, location: &str) -> PathBuf {
    let path = ctx.videos_root().join(location);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, b"media").unwrap();
    path
}

/// Writes the primary file at a stored location plus the given previews
/// (`"png"`, `"gif"`) next to it. Returns paths in the same order.
pub fn write_media_set(ctx: &TestContext, location: &str, previews: &[&str]) -> Vec<PathBuf> {
    let mut paths = vec![write_media(ctx, location)];
    for ext in previews {
        paths.push(write_media(ctx, &MediaStore::derived_location(location, ext)));
    }
    paths
}

/// Stored location from a serialized `/videos/...` URL.
pub fn stored_location(url: &Value) -> String {
    url.as_str()
        .unwrap()
        .trim_start_matches("/videos/")
        .to_string()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
