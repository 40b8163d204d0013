mod common;

use axum::http::StatusCode;
use common::*;
use osp_core::{ApiDoc, create_app};
use serde_json::json;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use utoipa::OpenApi;

/// Records the `request_id` field of every span opened while installed.
#[derive(Clone, Default)]
struct SpanRequestIds(Arc<Mutex<Vec<String>>>);

struct RequestIdVisitor(Option<String>);

impl Visit for RequestIdVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "request_id" {
            self.0 = Some(format!("{:?}", value));
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for SpanRequestIds {
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: Context<'_, S>,
    ) {
        let mut visitor = RequestIdVisitor(None);
        attrs.record(&mut visitor);
        if let Some(id) = visitor.0 {
            self.0.lock().unwrap().push(id);
        }
    }
}

#[tokio::test]
async fn test_health_check() {
    let ctx = setup().await;
    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["media"], "available");
}

#[tokio::test]
async fn test_trace_span_carries_minted_request_id() {
    let ctx = setup().await;
    let spans = SpanRequestIds::default();
    let _guard = tracing_subscriber::registry()
        .with(spans.clone())
        .set_default();

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", "/health", None))
        .await
        .unwrap();

    let minted = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert_eq!(*spans.0.lock().unwrap(), vec![minted]);
}

#[tokio::test]
async fn test_site_config_exposes_captcha_settings() {
    let ctx = setup().await;
    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", "/site-config", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "recaptchaEnabled": false, "recaptchaSiteKey": null })
    );
}

#[test]
fn test_openapi_declares_every_operation_tag() {
    let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
    let declared: Vec<&str> = doc["tags"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();

    for (path, item) in doc["paths"].as_object().unwrap() {
        for (method, operation) in item.as_object().unwrap() {
            for tag in operation["tags"].as_array().into_iter().flatten() {
                let tag = tag.as_str().unwrap();
                assert!(
                    declared.contains(&tag),
                    "{} {} uses undeclared tag {}",
                    method,
                    path,
                    tag
                );
            }
        }
    }
}

#[tokio::test]
async fn test_register_and_duplicate() {
    let ctx = setup().await;
    let payload = json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": PASSWORD,
        "password_confirm": PASSWORD,
    });

    let response = create_app(ctx.state.clone())
        .oneshot(json_request("POST", "/register", None, payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["page"], "/profile/alice/");
    assert!(body.get("password").is_none());

    let response = create_app(ctx.state.clone())
        .oneshot(json_request("POST", "/register", None, payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["errors"]["username"][0], "Username already taken");
    assert_eq!(body["errors"]["email"][0], "Email address already taken");
}

#[tokio::test]
async fn test_register_rejects_undeliverable_domain() {
    let ctx = setup().await;
    let response = create_app(ctx.state.clone())
        .oneshot(json_request(
            "POST",
            "/register",
            None,
            json!({
                "username": "carol",
                "email": "carol@mail.invalid",
                "password": PASSWORD,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["errors"]["email"].is_array());
}

#[tokio::test]
async fn test_login_flow() {
    let ctx = setup().await;
    register_user(&ctx, "alice").await;

    let response = create_app(ctx.state.clone())
        .oneshot(json_request(
            "POST",
            "/login",
            None,
            json!({ "email": "alice", "password": "nope-nope" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid Username or Password"
    );

    let response = create_app(ctx.state.clone())
        .oneshot(json_request(
            "POST",
            "/login",
            None,
            json!({ "email": "alice@example.com", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["username"], "alice");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = setup().await;
    register_user(&ctx, "alice").await;
    let token = login_token(&ctx, "alice").await;

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", "/users/me", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", "/users/me", Some("garbage")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", "/users/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["roles"], json!(["User"]));

    // Query parameter works as well
    let response = create_app(ctx.state.clone())
        .oneshot(empty_request(
            "GET",
            &format!("/users/me?token={}", token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_revoked_token_is_rejected() {
    let ctx = setup().await;
    register_user(&ctx, "alice").await;
    let token = login_token(&ctx, "alice").await;

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("POST", "/users/me/sessions/revoke", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", "/users/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_profile() {
    let ctx = setup().await;
    let user = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, user.id).await;

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", "/users/alice", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], user.id.to_string());
    assert_eq!(body["channels"], json!([channel.channel_loc]));
    assert!(body.get("email").is_none());

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", "/users/nobody", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_video_and_clip_lifecycle() {
    let ctx = setup().await;
    register_user(&ctx, "alice").await;
    let token = login_token(&ctx, "alice").await;

    let response = create_app(ctx.state.clone())
        .oneshot(json_request(
            "POST",
            "/channels",
            Some(&token),
            json!({ "channelName": "Main", "topic": 2 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let channel_id = body_json(response).await["id"].as_i64().unwrap();

    let response = create_app(ctx.state.clone())
        .oneshot(json_request(
            "POST",
            "/videos",
            Some(&token),
            json!({
                "channelID": channel_id,
                // Client-chosen locations are ignored
                "videoLocation": "someone-else/stream.mp4",
                "videoName": "Launch day",
                "length": 120.0,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let video = body_json(response).await;
    let video_id = video["id"].as_i64().unwrap();
    assert_eq!(video["videoName"], "Launch day");
    assert_eq!(video["topic"], 2);
    assert_eq!(video["upvotes"], 0);

    let location = stored_location(&video["videoLocation"]);
    assert_ne!(location, "someone-else/stream.mp4");
    let files = write_media_set(&ctx, &location, &["png"]);
    let (mp4, png) = (&files[0], &files[1]);

    let response = create_app(ctx.state.clone())
        .oneshot(json_request(
            "POST",
            &format!("/videos/{}/tags", video_id),
            Some(&token),
            json!({ "name": "launch" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request(
            "POST",
            &format!("/videos/{}/upvote", video_id),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({ "upvoted": true, "upvotes": 1 }));

    let response = create_app(ctx.state.clone())
        .oneshot(json_request(
            "POST",
            &format!("/videos/{}/comments", video_id),
            Some(&token),
            json!({ "comment": "nice" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = create_app(ctx.state.clone())
        .oneshot(json_request(
            "POST",
            &format!("/videos/{}/clips", video_id),
            Some(&token),
            json!({
                "startTime": 5.0,
                "endTime": 20.0,
                "name": "Liftoff",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let clip = body_json(response).await;
    let clip_id = clip["id"].as_i64().unwrap();
    assert_eq!(clip["length"], 15.0);
    assert_eq!(clip["channelID"], channel_id);

    // Public read
    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", &format!("/videos/{}", video_id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["upvotes"], 1);
    assert_eq!(body["ClipIDs"], json!([clip_id]));
    assert_eq!(body["tags"].as_array().map(Vec::len), Some(1));

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request(
            "GET",
            &format!("/videos/{}/comments", video_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await[0]["comment"], "nice");

    // Deleting needs a token
    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("DELETE", &format!("/videos/{}", video_id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request(
            "DELETE",
            &format!("/videos/{}", video_id),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!mp4.exists());
    assert!(!png.exists());

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", &format!("/videos/{}", video_id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", &format!("/clips/{}", clip_id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["parentVideo"].is_null());
}

#[tokio::test]
async fn test_cannot_delete_someone_elses_clip() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    register_user(&ctx, "mallory").await;
    let channel = create_channel(&ctx, owner.id).await;
    let video = create_video(&ctx, owner.id, channel.id).await;
    let clip = ctx
        .state
        .videos
        .create_clip(
            owner.id,
            video.id,
            osp_core::services::video_service::CreateClipRequest {
                start_time: 0.0,
                end_time: 1.0,
                name: "x".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();

    let token = login_token(&ctx, "mallory").await;
    let response = create_app(ctx.state.clone())
        .oneshot(empty_request(
            "DELETE",
            &format!("/clips/{}", clip.id),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deletion_request_and_cancel() {
    let ctx = setup().await;
    register_user(&ctx, "alice").await;
    let token = login_token(&ctx, "alice").await;

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("POST", "/users/me/deletion", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["scheduledAt"].is_string());

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", "/users/me", Some(&token)))
        .await
        .unwrap();
    assert!(body_json(response).await["deletionScheduledAt"].is_string());

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("DELETE", "/users/me/deletion", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("DELETE", "/users/me/deletion", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_socials_endpoints() {
    let ctx = setup().await;
    register_user(&ctx, "alice").await;
    let token = login_token(&ctx, "alice").await;

    let response = create_app(ctx.state.clone())
        .oneshot(json_request(
            "POST",
            "/users/me/socials",
            Some(&token),
            json!({ "socialType": "youtube", "url": "https://youtube.com/@alice" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let social_id = body_json(response).await["id"].as_i64().unwrap();

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request("GET", "/users/me/socials", Some(&token)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await[0]["socialType"], "youtube");

    let response = create_app(ctx.state.clone())
        .oneshot(empty_request(
            "DELETE",
            &format!("/users/me/socials/{}", social_id),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_guest_endpoint() {
    let ctx = setup().await;

    let response = create_app(ctx.state.clone())
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/guests")
                .header("Content-Type", "application/json")
                .header("x-forwarded-for", "198.51.100.4")
                .body(axum::body::Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let uuid = body["uuid"].as_str().unwrap().to_string();

    let response = create_app(ctx.state.clone())
        .oneshot(json_request("POST", "/guests", None, json!({ "uuid": uuid })))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["uuid"], uuid);
}
