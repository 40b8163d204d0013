mod common;

use common::*;
use osp_core::api::error::AppError;
use osp_core::entities::{prelude::*, *};
use osp_core::services::media_store::MediaStore;
use osp_core::services::video_service::{CreateClipRequest, CreateVideoRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

fn clip_request(start: f64, end: f64) -> CreateClipRequest {
    CreateClipRequest {
        start_time: start,
        end_time: end,
        name: "Best bit".to_string(),
        description: Some("the good part".to_string()),
    }
}

#[tokio::test]
async fn test_clip_copies_parent_and_computes_length() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, owner.id).await;
    let video = create_video(&ctx, owner.id, channel.id).await;

    let clip = ctx
        .state
        .videos
        .create_clip(owner.id, video.id, clip_request(10.0, 25.5))
        .await
        .unwrap();

    assert_eq!(clip.parent_video, Some(video.id));
    assert_eq!(clip.owning_user, video.owning_user);
    assert_eq!(clip.channel_id, video.channel_id);
    assert_eq!(clip.topic, video.topic);
    assert_eq!(clip.length, Some(15.5));
    assert_eq!(clip.views, Some(0));
    assert_eq!(clip.published, Some(true));
    assert!(clip.uuid.is_some());

    let location = clip.video_location.clone().unwrap();
    let channel_loc = channel.channel_loc.clone().unwrap();
    assert!(location.starts_with(&format!("{}/clips/", channel_loc)));
    assert_eq!(
        clip.thumbnail_location,
        Some(MediaStore::derived_location(&location, "png"))
    );

    let json = serde_json::to_value(ctx.state.videos.serialize_clip(&clip)).unwrap();
    assert_eq!(json["parentVideo"], video.id);
    assert_eq!(json["name"], "Best bit");
    assert_eq!(json["videoLocation"], format!("/videos/{}", location));
    assert_eq!(json["length"], 15.5);
}

#[tokio::test]
async fn test_video_inherits_channel_topic() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, owner.id).await;
    let video = create_video(&ctx, owner.id, channel.id).await;

    assert_eq!(video.topic, channel.topic);
    assert_eq!(video.pending, Some(true));
    assert_eq!(video.channel_name.as_deref(), Some("Friday stream"));

    let location = video.video_location.clone().unwrap();
    assert!(location.starts_with(&format!("{}/", channel.channel_loc.clone().unwrap())));
    assert_eq!(
        video.thumbnail_location,
        Some(MediaStore::derived_location(&location, "png"))
    );
    assert_eq!(
        video.gif_location,
        Some(MediaStore::derived_location(&location, "gif"))
    );
}

#[tokio::test]
async fn test_clip_bounds_are_validated() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, owner.id).await;
    let video = create_video(&ctx, owner.id, channel.id).await;

    for (start, end) in [(-1.0, 5.0), (5.0, 5.0), (8.0, 2.0), (0.0, 601.0), (f64::NAN, 3.0)] {
        let result = ctx
            .state
            .videos
            .create_clip(owner.id, video.id, clip_request(start, end))
            .await;
        assert!(
            matches!(result, Err(AppError::BadRequest(_))),
            "({}, {}) should be rejected",
            start,
            end
        );
    }
}

#[tokio::test]
async fn test_only_owner_may_clip_or_delete() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let stranger = register_user(&ctx, "mallory").await;
    let channel = create_channel(&ctx, owner.id).await;
    let video = create_video(&ctx, owner.id, channel.id).await;

    assert!(matches!(
        ctx.state
            .videos
            .create_clip(stranger.id, video.id, clip_request(0.0, 5.0))
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        ctx.state.videos.delete_video(stranger.id, video.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        ctx.state
            .videos
            .create_video(stranger.id, video_request(channel.id))
            .await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_delete_video_removes_media_and_children() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let fan = register_user(&ctx, "bob").await;
    let channel = create_channel(&ctx, owner.id).await;
    let video = create_video(&ctx, owner.id, channel.id).await;

    let files = write_media_set(&ctx, video.video_location.as_deref().unwrap(), &["png", "gif"]);
    assert!(ctx.state.videos.video_exists_on_disk(&video).await);

    ctx.state
        .videos
        .add_video_tag(owner.id, video.id, "speedrun")
        .await
        .unwrap();
    ctx.state
        .videos
        .toggle_video_upvote(fan.id, video.id)
        .await
        .unwrap();
    ctx.state
        .videos
        .add_comment(fan.id, video.id, "gg")
        .await
        .unwrap();
    let clip = ctx
        .state
        .videos
        .create_clip(owner.id, video.id, clip_request(1.0, 2.0))
        .await
        .unwrap();

    ctx.state.videos.delete_video(owner.id, video.id).await.unwrap();

    assert!(files.iter().all(|f| !f.exists()));
    assert!(matches!(
        ctx.state.videos.get_video(video.id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(VideoTags::find().count(ctx.db()).await.unwrap(), 0);
    assert_eq!(VideoUpvotes::find().count(ctx.db()).await.unwrap(), 0);
    assert_eq!(VideoComments::find().count(ctx.db()).await.unwrap(), 0);

    // The clip survives, detached from its parent
    let orphan = ctx.state.videos.get_clip(clip.id).await.unwrap();
    assert_eq!(orphan.parent_video, None);
}

#[tokio::test]
async fn test_delete_with_missing_media_is_not_an_error() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, owner.id).await;

    let bare = create_video(&ctx, owner.id, channel.id).await;
    assert!(!ctx.state.videos.video_exists_on_disk(&bare).await);
    ctx.state.videos.delete_video(owner.id, bare.id).await.unwrap();

    // Only the primary and the thumbnail exist
    let partial = create_video(&ctx, owner.id, channel.id).await;
    let files = write_media_set(&ctx, partial.video_location.as_deref().unwrap(), &["png"]);
    ctx.state.videos.delete_video(owner.id, partial.id).await.unwrap();
    assert!(files.iter().all(|f| !f.exists()));
}

#[tokio::test]
async fn test_delete_clip_removes_media_and_children() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, owner.id).await;
    let video = create_video(&ctx, owner.id, channel.id).await;
    let clip = ctx
        .state
        .videos
        .create_clip(owner.id, video.id, clip_request(1.0, 2.0))
        .await
        .unwrap();

    let parent_files =
        write_media_set(&ctx, video.video_location.as_deref().unwrap(), &["png", "gif"]);
    let clip_files = write_media_set(&ctx, clip.video_location.as_deref().unwrap(), &["gif"]);
    ctx.state
        .videos
        .add_clip_tag(owner.id, clip.id, "highlight")
        .await
        .unwrap();
    ctx.state
        .videos
        .toggle_clip_upvote(owner.id, clip.id)
        .await
        .unwrap();

    ctx.state.videos.delete_clip(owner.id, clip.id).await.unwrap();

    assert!(clip_files.iter().all(|f| !f.exists()));
    assert!(parent_files.iter().all(|f| f.exists()));
    assert_eq!(ClipTags::find().count(ctx.db()).await.unwrap(), 0);
    assert_eq!(ClipUpvotes::find().count(ctx.db()).await.unwrap(), 0);
    // Parent video untouched
    assert!(ctx.state.videos.get_video(video.id).await.is_ok());
}

#[tokio::test]
async fn test_upvote_toggles() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let fan = register_user(&ctx, "bob").await;
    let channel = create_channel(&ctx, owner.id).await;
    let video = create_video(&ctx, owner.id, channel.id).await;

    let videos = &ctx.state.videos;
    assert_eq!(videos.toggle_video_upvote(fan.id, video.id).await.unwrap(), (true, 1));
    assert_eq!(videos.toggle_video_upvote(owner.id, video.id).await.unwrap(), (true, 2));
    assert_eq!(videos.toggle_video_upvote(fan.id, video.id).await.unwrap(), (false, 1));

    let fan_votes = VideoUpvotes::find()
        .filter(video_upvotes::Column::UserId.eq(fan.id))
        .count(ctx.db())
        .await
        .unwrap();
    assert_eq!(fan_votes, 0);
}

#[tokio::test]
async fn test_comments_respect_allow_comments() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, owner.id).await;

    let mut req = video_request(channel.id);
    req.allow_comments = false;
    let quiet = ctx.state.videos.create_video(owner.id, req).await.unwrap();

    assert!(matches!(
        ctx.state.videos.add_comment(owner.id, quiet.id, "hello").await,
        Err(AppError::Forbidden(_))
    ));

    let open = create_video(&ctx, owner.id, channel.id).await;
    assert!(matches!(
        ctx.state.videos.add_comment(owner.id, open.id, "   ").await,
        Err(AppError::BadRequest(_))
    ));
    let comment = ctx
        .state
        .videos
        .add_comment(owner.id, open.id, " first! ")
        .await
        .unwrap();
    assert_eq!(comment.comment.as_deref(), Some("first!"));
    assert_eq!(ctx.state.videos.comments(open.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_serialize_video_counts_children() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, owner.id).await;
    let video = create_video(&ctx, owner.id, channel.id).await;

    let tag = ctx
        .state
        .videos
        .add_video_tag(owner.id, video.id, "  chill ")
        .await
        .unwrap();
    assert_eq!(tag.name.as_deref(), Some("chill"));
    let clip = ctx
        .state
        .videos
        .create_clip(owner.id, video.id, clip_request(0.0, 30.0))
        .await
        .unwrap();
    ctx.state
        .videos
        .toggle_video_upvote(owner.id, video.id)
        .await
        .unwrap();

    let json = serde_json::to_value(ctx.state.videos.serialize_video(&video).await.unwrap())
        .unwrap();
    assert_eq!(json["upvotes"], 1);
    assert_eq!(json["ClipIDs"], serde_json::json!([clip.id]));
    assert_eq!(json["tags"], serde_json::json!([tag.id]));
    assert_eq!(json["videoName"], "Friday stream");
    assert_eq!(json["channelID"], channel.id);
    let location = video.video_location.clone().unwrap();
    assert_eq!(json["videoLocation"], format!("/videos/{}", location));
    assert_eq!(
        json["thumbnailLocation"],
        format!("/videos/{}", MediaStore::derived_location(&location, "png"))
    );
    assert_eq!(
        json["gifLocation"],
        format!("/videos/{}", MediaStore::derived_location(&location, "gif"))
    );

    ctx.state
        .videos
        .remove_video_tag(owner.id, video.id, tag.id)
        .await
        .unwrap();
    assert!(matches!(
        ctx.state
            .videos
            .remove_video_tag(owner.id, video.id, tag.id)
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_escaping_location_is_never_deleted() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, owner.id).await;

    let outside = ctx.media_dir.path().join("secret.mp4");
    std::fs::write(&outside, b"keep").unwrap();

    // Rows written by older tooling may still carry such a location
    let video = create_video(&ctx, owner.id, channel.id).await;
    let mut active: recorded_video::ActiveModel = video.clone().into();
    active.video_location = Set(Some("../secret.mp4".to_string()));
    active.update(ctx.db()).await.unwrap();

    ctx.state.videos.delete_video(owner.id, video.id).await.unwrap();

    assert!(outside.exists());
}

#[tokio::test]
async fn test_videos_get_distinct_locations_in_their_own_channel() {
    let ctx = setup().await;
    let alice = register_user(&ctx, "alice").await;
    let mallory = register_user(&ctx, "mallory").await;
    let alice_channel = create_channel(&ctx, alice.id).await;
    let mallory_channel = create_channel(&ctx, mallory.id).await;

    let alice_video = create_video(&ctx, alice.id, alice_channel.id).await;
    let alice_location = alice_video.video_location.clone().unwrap();
    let alice_files = write_media_set(&ctx, &alice_location, &["png", "gif"]);

    // A client-supplied location has no way in
    let req: CreateVideoRequest = serde_json::from_value(serde_json::json!({
        "channelID": mallory_channel.id,
        "videoLocation": alice_location,
    }))
    .unwrap();
    let mallory_video = ctx.state.videos.create_video(mallory.id, req).await.unwrap();
    let mallory_location = mallory_video.video_location.clone().unwrap();

    assert_ne!(mallory_location, alice_location);
    assert!(mallory_location.starts_with(&format!(
        "{}/",
        mallory_channel.channel_loc.clone().unwrap()
    )));

    ctx.state
        .videos
        .delete_video(mallory.id, mallory_video.id)
        .await
        .unwrap();

    assert!(alice_files.iter().all(|f| f.exists()));
    assert!(ctx.state.videos.get_video(alice_video.id).await.is_ok());

    let second = create_video(&ctx, alice.id, alice_channel.id).await;
    assert_ne!(second.video_location, alice_video.video_location);
}

#[tokio::test]
async fn test_clip_delete_leaves_parent_media() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, owner.id).await;
    let video = create_video(&ctx, owner.id, channel.id).await;
    let parent_files =
        write_media_set(&ctx, video.video_location.as_deref().unwrap(), &["png", "gif"]);

    let first = ctx
        .state
        .videos
        .create_clip(owner.id, video.id, clip_request(0.0, 5.0))
        .await
        .unwrap();
    let second = ctx
        .state
        .videos
        .create_clip(owner.id, video.id, clip_request(0.0, 5.0))
        .await
        .unwrap();
    assert_ne!(first.video_location, video.video_location);
    assert_ne!(first.video_location, second.video_location);

    let second_files = write_media_set(&ctx, second.video_location.as_deref().unwrap(), &[]);
    ctx.state.videos.delete_clip(owner.id, first.id).await.unwrap();

    assert!(parent_files.iter().all(|f| f.exists()));
    assert!(second_files.iter().all(|f| f.exists()));
}

#[tokio::test]
async fn test_duplicate_tag_conflicts() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, owner.id).await;
    let video = create_video(&ctx, owner.id, channel.id).await;
    let clip = ctx
        .state
        .videos
        .create_clip(owner.id, video.id, clip_request(0.0, 5.0))
        .await
        .unwrap();

    let videos = &ctx.state.videos;
    videos.add_video_tag(owner.id, video.id, "retro").await.unwrap();
    assert!(matches!(
        videos.add_video_tag(owner.id, video.id, " retro ").await,
        Err(AppError::Conflict(_))
    ));
    videos.add_clip_tag(owner.id, clip.id, "retro").await.unwrap();
    assert!(matches!(
        videos.add_clip_tag(owner.id, clip.id, "retro").await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_channel_without_location_is_refused() {
    let ctx = setup().await;
    let owner = register_user(&ctx, "alice").await;
    let channel = create_channel(&ctx, owner.id).await;

    let mut active: channel::ActiveModel = channel.clone().into();
    active.channel_loc = Set(None);
    active.update(ctx.db()).await.unwrap();

    assert!(matches!(
        ctx.state
            .videos
            .create_video(owner.id, video_request(channel.id))
            .await,
        Err(AppError::Internal(_))
    ));
}
