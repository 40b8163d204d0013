//! JSON shapes handed to front-end consumers. Field names and the URL
//! prefixes on asset paths are part of that contract.

use crate::entities::{
    channel, clip_tags, clips, recorded_video, user, user_social, video_comments, video_tags,
};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const VIDEO_URL_PREFIX: &str = "/videos/";
pub const IMAGE_URL_PREFIX: &str = "/images/";

/// `YYYY-MM-DD HH:MM:SS`, with `.ffffff` only when there is a sub-second part.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    if dt.nanosecond() / 1_000 == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

pub fn media_url(prefix: &str, location: Option<&str>) -> Option<String> {
    location.map(|l| format!("{}{}", prefix, l))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: i32,
    pub uuid: Option<String>,
    #[serde(rename = "channelID")]
    pub channel_id: Option<i32>,
    pub owning_user: Option<i32>,
    pub video_date: Option<String>,
    pub video_name: Option<String>,
    pub description: Option<String>,
    pub topic: Option<i32>,
    pub views: Option<i32>,
    pub length: Option<f64>,
    pub upvotes: u64,
    pub video_location: Option<String>,
    pub thumbnail_location: Option<String>,
    pub gif_location: Option<String>,
    #[serde(rename = "ClipIDs")]
    pub clip_ids: Vec<i32>,
    pub tags: Vec<i32>,
}

impl VideoResponse {
    pub fn new(
        video: &recorded_video::Model,
        upvotes: u64,
        clip_ids: Vec<i32>,
        tag_ids: Vec<i32>,
    ) -> Self {
        Self {
            id: video.id,
            uuid: video.uuid.clone(),
            channel_id: video.channel_id,
            owning_user: video.owning_user,
            video_date: video.video_date.as_ref().map(format_timestamp),
            video_name: video.channel_name.clone(),
            description: video.description.clone(),
            topic: video.topic,
            views: video.views,
            length: video.length,
            upvotes,
            video_location: media_url(VIDEO_URL_PREFIX, video.video_location.as_deref()),
            thumbnail_location: media_url(
                VIDEO_URL_PREFIX,
                video.thumbnail_location.as_deref(),
            ),
            gif_location: media_url(VIDEO_URL_PREFIX, video.gif_location.as_deref()),
            clip_ids,
            tags: tag_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClipResponse {
    pub id: i32,
    pub uuid: Option<String>,
    pub clip_date: Option<String>,
    pub parent_video: Option<i32>,
    pub owning_user: Option<i32>,
    #[serde(rename = "channelID")]
    pub channel_id: Option<i32>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub length: Option<f64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub topic: Option<i32>,
    pub views: Option<i32>,
    pub video_location: Option<String>,
    pub thumbnail_location: Option<String>,
    pub gif_location: Option<String>,
}

impl From<&clips::Model> for ClipResponse {
    fn from(clip: &clips::Model) -> Self {
        Self {
            id: clip.id,
            uuid: clip.uuid.clone(),
            clip_date: clip.clip_date.as_ref().map(format_timestamp),
            parent_video: clip.parent_video,
            owning_user: clip.owning_user,
            channel_id: clip.channel_id,
            start_time: clip.start_time,
            end_time: clip.end_time,
            length: clip.length,
            name: clip.clip_name.clone(),
            description: clip.description.clone(),
            topic: clip.topic,
            views: clip.views,
            video_location: media_url(VIDEO_URL_PREFIX, clip.video_location.as_deref()),
            thumbnail_location: media_url(VIDEO_URL_PREFIX, clip.thumbnail_location.as_deref()),
            gif_location: media_url(VIDEO_URL_PREFIX, clip.gif_location.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Rendered as a string for historical reasons.
    pub id: String,
    pub uuid: Option<String>,
    pub username: Option<String>,
    pub biography: Option<String>,
    pub picture_location: Option<String>,
    pub banner_location: Option<String>,
    pub channels: Vec<String>,
    pub page: String,
}

impl UserResponse {
    pub fn new(user: &user::Model, channels: &[channel::Model]) -> Self {
        Self {
            id: user.id.to_string(),
            uuid: user.uuid.clone(),
            username: user.username.clone(),
            biography: user.biography.clone(),
            picture_location: media_url(IMAGE_URL_PREFIX, user.picture_location.as_deref()),
            banner_location: media_url(IMAGE_URL_PREFIX, user.banner_location.as_deref()),
            channels: channels
                .iter()
                .filter_map(|c| c.channel_loc.clone())
                .collect(),
            page: format!("/profile/{}/", user.username.as_deref().unwrap_or_default()),
        }
    }
}

/// The caller's own account: public profile plus private fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[serde(flatten)]
    pub profile: UserResponse,
    pub email: Option<String>,
    pub roles: Vec<String>,
    /// Union of the permissions granted by every role, sorted.
    pub permissions: Vec<String>,
    pub socials: Vec<SocialResponse>,
    pub deletion_scheduled_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SocialResponse {
    pub id: i32,
    pub social_type: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub id: i32,
    pub channel_name: Option<String>,
    pub channel_loc: Option<String>,
    pub owning_user: Option<i32>,
    pub topic: Option<i32>,
}

impl From<&channel::Model> for ChannelResponse {
    fn from(c: &channel::Model) -> Self {
        Self {
            id: c.id,
            channel_name: c.channel_name.clone(),
            channel_loc: c.channel_loc.clone(),
            owning_user: c.owning_user,
            topic: c.topic,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: i32,
    pub name: Option<String>,
    pub tagged_by_user: Option<i32>,
}

impl From<&user_social::Model> for SocialResponse {
    fn from(s: &user_social::Model) -> Self {
        Self {
            id: s.id,
            social_type: s.social_type.clone(),
            url: s.url.clone(),
        }
    }
}

impl From<&video_tags::Model> for TagResponse {
    fn from(t: &video_tags::Model) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            tagged_by_user: t.tagged_by_user,
        }
    }
}

impl From<&clip_tags::Model> for TagResponse {
    fn from(t: &clip_tags::Model) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            tagged_by_user: t.tagged_by_user,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i32,
    #[serde(rename = "userID")]
    pub user_id: Option<i32>,
    pub timestamp: Option<String>,
    pub comment: Option<String>,
    #[serde(rename = "videoID")]
    pub video_id: Option<i32>,
}

impl From<&video_comments::Model> for CommentResponse {
    fn from(c: &video_comments::Model) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            timestamp: c.timestamp.as_ref().map(format_timestamp),
            comment: c.comment.clone(),
            video_id: c.video_id,
        }
    }
}

/// Result of toggling an upvote.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpvoteResponse {
    pub upvoted: bool,
    pub upvotes: u64,
}
