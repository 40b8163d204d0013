use crate::api::error::AppError;
use crate::entities::clips::NewClip;
use crate::entities::recorded_video::NewRecordedVideo;
use crate::entities::{prelude::*, *};
use crate::models::{ClipResponse, VideoResponse};
use crate::services::media_lifecycle::MediaLifecycleService;
use crate::services::media_store::MediaStore;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

const MAX_TAG_LENGTH: usize = 255;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelRequest {
    pub channel_name: String,
    pub topic: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    #[serde(rename = "channelID")]
    pub channel_id: i32,
    /// Display name; defaults to the channel name.
    pub video_name: Option<String>,
    pub topic: Option<i32>,
    pub description: Option<String>,
    pub length: Option<f64>,
    pub video_date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub allow_comments: bool,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClipRequest {
    pub start_time: f64,
    pub end_time: f64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TagRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub comment: String,
}

fn default_true() -> bool {
    true
}

fn normalize_tag(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Tag name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_TAG_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Tag name longer than {} characters",
            MAX_TAG_LENGTH
        )));
    }
    Ok(name.to_string())
}

/// Media of a channel lives under its `channelLoc`; rows without one are corrupt.
fn channel_dir(channel: &channel::Model) -> Result<&str, AppError> {
    channel
        .channel_loc
        .as_deref()
        .map(str::trim)
        .filter(|loc| !loc.is_empty())
        .ok_or_else(|| {
            AppError::Internal(format!("Channel {} has no storage location", channel.id))
        })
}

/// Recorded videos, the clips cut from them, and the channels that own both.
pub struct VideoService {
    db: DatabaseConnection,
    media: MediaStore,
}

impl VideoService {
    pub fn new(db: DatabaseConnection, media: MediaStore) -> Self {
        Self { db, media }
    }

    // Channels

    pub async fn create_channel(
        &self,
        owner_id: i32,
        req: CreateChannelRequest,
    ) -> Result<channel::Model, AppError> {
        let name = req.channel_name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "channelName cannot be empty".to_string(),
            ));
        }

        let model = channel::ActiveModel {
            owning_user: Set(Some(owner_id)),
            channel_name: Set(Some(name.to_string())),
            channel_loc: Set(Some(Uuid::new_v4().simple().to_string())),
            topic: Set(req.topic),
            description: Set(req.description),
            ..Default::default()
        };

        let channel = model.insert(&self.db).await?;
        tracing::info!("📺 Channel {} created for user {}", channel.id, owner_id);
        Ok(channel)
    }

    pub async fn channels_for_user(&self, user_id: i32) -> Result<Vec<channel::Model>, AppError> {
        Ok(Channel::find()
            .filter(channel::Column::OwningUser.eq(user_id))
            .order_by_asc(channel::Column::Id)
            .all(&self.db)
            .await?)
    }

    // Videos

    pub async fn create_video(
        &self,
        owner_id: i32,
        req: CreateVideoRequest,
    ) -> Result<recorded_video::Model, AppError> {
        let channel = Channel::find_by_id(req.channel_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))?;

        if channel.owning_user != Some(owner_id) {
            return Err(AppError::Forbidden(
                "Channel belongs to another user".to_string(),
            ));
        }

        let video_location = MediaStore::new_video_location(channel_dir(&channel)?);
        let name = req
            .video_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .or(channel.channel_name.clone())
            .unwrap_or_default();

        let mut active = NewRecordedVideo {
            owning_user: owner_id,
            channel_id: channel.id,
            channel_name: name,
            topic: req.topic.or(channel.topic),
            views: 0,
            video_location: video_location.clone(),
            video_date: req.video_date.unwrap_or_else(Utc::now),
            allow_comments: req.allow_comments,
            published: req.published,
        }
        .into_active_model();
        active.description = Set(req.description);
        active.length = Set(req.length);
        active.thumbnail_location = Set(Some(MediaStore::derived_location(
            &video_location,
            "png",
        )));
        active.gif_location = Set(Some(MediaStore::derived_location(
            &video_location,
            "gif",
        )));

        let video = active.insert(&self.db).await?;
        tracing::info!("🎞️  Video {} created in channel {}", video.id, channel.id);
        Ok(video)
    }

    pub async fn get_video(&self, video_id: i32) -> Result<recorded_video::Model, AppError> {
        RecordedVideo::find_by_id(video_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }

    pub async fn video_exists_on_disk(&self, video: &recorded_video::Model) -> bool {
        self.media.video_exists(video.video_location.as_deref()).await
    }

    pub async fn serialize_video(
        &self,
        video: &recorded_video::Model,
    ) -> Result<VideoResponse, AppError> {
        let upvotes = video.find_related(VideoUpvotes).count(&self.db).await?;

        let clip_ids: Vec<i32> = Clips::find()
            .select_only()
            .column(clips::Column::Id)
            .filter(clips::Column::ParentVideo.eq(video.id))
            .order_by_asc(clips::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;

        let tag_ids: Vec<i32> = VideoTags::find()
            .select_only()
            .column(video_tags::Column::Id)
            .filter(video_tags::Column::VideoId.eq(video.id))
            .order_by_asc(video_tags::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(VideoResponse::new(video, upvotes, clip_ids, tag_ids))
    }

    async fn owned_video(
        &self,
        user_id: i32,
        video_id: i32,
    ) -> Result<recorded_video::Model, AppError> {
        let video = self.get_video(video_id).await?;
        if video.owning_user != Some(user_id) {
            return Err(AppError::Forbidden(
                "Video belongs to another user".to_string(),
            ));
        }
        Ok(video)
    }

    /// Deletes the rows first; files go afterwards and are best effort.
    pub async fn delete_video(&self, user_id: i32, video_id: i32) -> Result<(), AppError> {
        let video = self.owned_video(user_id, video_id).await?;

        let txn = self.db.begin().await?;
        MediaLifecycleService::delete_video_rows(&txn, video.id).await?;
        txn.commit().await?;

        let removed = self.media.remove_media(video.video_location.as_deref()).await;
        tracing::info!(
            "🗑️  Video {} deleted by user {} ({} file(s) removed)",
            video.id,
            user_id,
            removed.len()
        );
        Ok(())
    }

    pub async fn add_video_tag(
        &self,
        user_id: i32,
        video_id: i32,
        name: &str,
    ) -> Result<video_tags::Model, AppError> {
        let video = self.owned_video(user_id, video_id).await?;
        let name = normalize_tag(name)?;

        let duplicate = VideoTags::find()
            .filter(video_tags::Column::VideoId.eq(video.id))
            .filter(video_tags::Column::Name.eq(name.as_str()))
            .count(&self.db)
            .await?;
        if duplicate > 0 {
            return Err(AppError::Conflict(format!("Video already tagged '{}'", name)));
        }

        Ok(video_tags::new_tag(&name, video.id, user_id)
            .insert(&self.db)
            .await?)
    }

    pub async fn video_tags(&self, video_id: i32) -> Result<Vec<video_tags::Model>, AppError> {
        let video = self.get_video(video_id).await?;
        Ok(video
            .find_related(VideoTags)
            .order_by_asc(video_tags::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn remove_video_tag(
        &self,
        user_id: i32,
        video_id: i32,
        tag_id: i32,
    ) -> Result<(), AppError> {
        let video = self.owned_video(user_id, video_id).await?;
        let result = VideoTags::delete_many()
            .filter(video_tags::Column::Id.eq(tag_id))
            .filter(video_tags::Column::VideoId.eq(video.id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Tag not found".to_string()));
        }
        Ok(())
    }

    /// Adds the caller's upvote, or takes it back. Returns (upvoted, total).
    pub async fn toggle_video_upvote(
        &self,
        user_id: i32,
        video_id: i32,
    ) -> Result<(bool, u64), AppError> {
        let video = self.get_video(video_id).await?;

        let existing = VideoUpvotes::find()
            .filter(video_upvotes::Column::VideoId.eq(video.id))
            .filter(video_upvotes::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        let upvoted = match existing {
            Some(vote) => {
                vote.delete(&self.db).await?;
                false
            }
            None => {
                video_upvotes::ActiveModel {
                    user_id: Set(Some(user_id)),
                    video_id: Set(Some(video.id)),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?;
                true
            }
        };

        let total = video.find_related(VideoUpvotes).count(&self.db).await?;
        Ok((upvoted, total))
    }

    pub async fn add_comment(
        &self,
        user_id: i32,
        video_id: i32,
        comment: &str,
    ) -> Result<video_comments::Model, AppError> {
        let video = self.get_video(video_id).await?;
        if !video.allow_comments.unwrap_or(false) {
            return Err(AppError::Forbidden(
                "Comments are disabled for this video".to_string(),
            ));
        }

        let comment = comment.trim();
        if comment.is_empty() {
            return Err(AppError::BadRequest("Comment cannot be empty".to_string()));
        }

        Ok(video_comments::ActiveModel {
            user_id: Set(Some(user_id)),
            timestamp: Set(Some(Utc::now())),
            comment: Set(Some(comment.to_string())),
            video_id: Set(Some(video.id)),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn comments(&self, video_id: i32) -> Result<Vec<video_comments::Model>, AppError> {
        let video = self.get_video(video_id).await?;
        Ok(video
            .find_related(VideoComments)
            .order_by_asc(video_comments::Column::Id)
            .all(&self.db)
            .await?)
    }

    // Clips

    pub async fn create_clip(
        &self,
        user_id: i32,
        video_id: i32,
        req: CreateClipRequest,
    ) -> Result<clips::Model, AppError> {
        let parent = self.owned_video(user_id, video_id).await?;

        if !req.start_time.is_finite() || !req.end_time.is_finite() {
            return Err(AppError::BadRequest(
                "Clip bounds must be finite numbers".to_string(),
            ));
        }
        if req.start_time < 0.0 || req.end_time <= req.start_time {
            return Err(AppError::BadRequest(
                "Clip must satisfy 0 <= startTime < endTime".to_string(),
            ));
        }
        if let Some(length) = parent.length
            && req.end_time > length
        {
            return Err(AppError::BadRequest(
                "Clip ends after the parent video".to_string(),
            ));
        }

        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Clip name cannot be empty".to_string()));
        }

        let channel = match parent.channel_id {
            Some(id) => Channel::find_by_id(id).one(&self.db).await?,
            None => None,
        }
        .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))?;

        let video_location = MediaStore::new_clip_location(channel_dir(&channel)?);
        let mut active = NewClip {
            clip_date: Utc::now(),
            video_location: video_location.clone(),
            start_time: req.start_time,
            end_time: req.end_time,
            clip_name: name.to_string(),
            description: req.description,
        }
        .into_active_model(&parent);
        active.thumbnail_location = Set(Some(MediaStore::derived_location(
            &video_location,
            "png",
        )));
        active.gif_location = Set(Some(MediaStore::derived_location(
            &video_location,
            "gif",
        )));

        let clip = active.insert(&self.db).await?;

        tracing::info!("✂️  Clip {} cut from video {}", clip.id, parent.id);
        Ok(clip)
    }

    pub async fn get_clip(&self, clip_id: i32) -> Result<clips::Model, AppError> {
        Clips::find_by_id(clip_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Clip not found".to_string()))
    }

    pub fn serialize_clip(&self, clip: &clips::Model) -> ClipResponse {
        ClipResponse::from(clip)
    }

    async fn owned_clip(&self, user_id: i32, clip_id: i32) -> Result<clips::Model, AppError> {
        let clip = self.get_clip(clip_id).await?;
        if clip.owning_user != Some(user_id) {
            return Err(AppError::Forbidden(
                "Clip belongs to another user".to_string(),
            ));
        }
        Ok(clip)
    }

    pub async fn delete_clip(&self, user_id: i32, clip_id: i32) -> Result<(), AppError> {
        let clip = self.owned_clip(user_id, clip_id).await?;

        let txn = self.db.begin().await?;
        MediaLifecycleService::delete_clip_rows(&txn, clip.id).await?;
        txn.commit().await?;

        let removed = self.media.remove_media(clip.video_location.as_deref()).await;
        tracing::info!(
            "🗑️  Clip {} deleted by user {} ({} file(s) removed)",
            clip.id,
            user_id,
            removed.len()
        );
        Ok(())
    }

    pub async fn add_clip_tag(
        &self,
        user_id: i32,
        clip_id: i32,
        name: &str,
    ) -> Result<clip_tags::Model, AppError> {
        let clip = self.owned_clip(user_id, clip_id).await?;
        let name = normalize_tag(name)?;

        let duplicate = ClipTags::find()
            .filter(clip_tags::Column::ClipId.eq(clip.id))
            .filter(clip_tags::Column::Name.eq(name.as_str()))
            .count(&self.db)
            .await?;
        if duplicate > 0 {
            return Err(AppError::Conflict(format!("Clip already tagged '{}'", name)));
        }

        Ok(clip_tags::new_tag(&name, clip.id, user_id)
            .insert(&self.db)
            .await?)
    }

    pub async fn clip_tags(&self, clip_id: i32) -> Result<Vec<clip_tags::Model>, AppError> {
        let clip = self.get_clip(clip_id).await?;
        Ok(clip
            .find_related(ClipTags)
            .order_by_asc(clip_tags::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn toggle_clip_upvote(
        &self,
        user_id: i32,
        clip_id: i32,
    ) -> Result<(bool, u64), AppError> {
        let clip = self.get_clip(clip_id).await?;

        let existing = ClipUpvotes::find()
            .filter(clip_upvotes::Column::ClipId.eq(clip.id))
            .filter(clip_upvotes::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        let upvoted = match existing {
            Some(vote) => {
                vote.delete(&self.db).await?;
                false
            }
            None => {
                clip_upvotes::ActiveModel {
                    user_id: Set(Some(user_id)),
                    clip_id: Set(Some(clip.id)),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?;
                true
            }
        };

        let total = clip.find_related(ClipUpvotes).count(&self.db).await?;
        Ok((upvoted, total))
    }
}
