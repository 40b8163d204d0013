use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "RecordedVideo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub uuid: Option<String>,
    #[sea_orm(column_name = "videoDate")]
    pub video_date: Option<DateTimeUtc>,
    #[sea_orm(column_name = "owningUser")]
    pub owning_user: Option<i32>,
    #[sea_orm(column_name = "channelName")]
    pub channel_name: Option<String>,
    #[sea_orm(column_name = "channelID")]
    pub channel_id: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub topic: Option<i32>,
    pub views: Option<i32>,
    pub length: Option<f64>,
    #[sea_orm(column_name = "videoLocation")]
    pub video_location: Option<String>,
    #[sea_orm(column_name = "thumbnailLocation")]
    pub thumbnail_location: Option<String>,
    #[sea_orm(column_name = "gifLocation")]
    pub gif_location: Option<String>,
    pub pending: Option<bool>,
    #[sea_orm(column_name = "allowComments")]
    pub allow_comments: Option<bool>,
    pub published: Option<bool>,
    #[sea_orm(column_name = "originalStreamID")]
    pub original_stream_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwningUser",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::channel::Entity",
        from = "Column::ChannelId",
        to = "super::channel::Column::Id"
    )]
    Channel,
    #[sea_orm(has_many = "super::video_upvotes::Entity")]
    Upvotes,
    #[sea_orm(has_many = "super::video_comments::Entity")]
    Comments,
    #[sea_orm(has_many = "super::clips::Entity")]
    Clips,
    #[sea_orm(has_many = "super::video_tags::Entity")]
    Tags,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::channel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Channel.def()
    }
}

impl Related<super::video_upvotes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Upvotes.def()
    }
}

impl Related<super::video_comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::clips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clips.def()
    }
}

impl Related<super::video_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields a caller supplies when a recording or upload lands.
#[derive(Debug, Clone)]
pub struct NewRecordedVideo {
    pub owning_user: i32,
    pub channel_id: i32,
    pub channel_name: String,
    pub topic: Option<i32>,
    pub views: i32,
    pub video_location: String,
    pub video_date: DateTimeUtc,
    pub allow_comments: bool,
    pub published: bool,
}

impl NewRecordedVideo {
    /// Every new video starts out pending until processing finishes.
    pub fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            uuid: Set(Some(Uuid::new_v4().to_string())),
            video_date: Set(Some(self.video_date)),
            owning_user: Set(Some(self.owning_user)),
            channel_id: Set(Some(self.channel_id)),
            channel_name: Set(Some(self.channel_name)),
            topic: Set(self.topic),
            views: Set(Some(self.views)),
            video_location: Set(Some(self.video_location)),
            pending: Set(Some(true)),
            published: Set(Some(self.published)),
            allow_comments: Set(Some(self.allow_comments)),
            ..Default::default()
        }
    }
}
