use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Clips")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub uuid: Option<String>,
    #[sea_orm(column_name = "clipDate")]
    pub clip_date: Option<DateTimeUtc>,
    #[sea_orm(column_name = "owningUser")]
    pub owning_user: Option<i32>,
    #[sea_orm(column_name = "channelID")]
    pub channel_id: Option<i32>,
    #[sea_orm(column_name = "parentVideo")]
    pub parent_video: Option<i32>,
    #[sea_orm(column_name = "startTime")]
    pub start_time: Option<f64>,
    #[sea_orm(column_name = "endTime")]
    pub end_time: Option<f64>,
    pub length: Option<f64>,
    pub views: Option<i32>,
    #[sea_orm(column_name = "clipName")]
    pub clip_name: Option<String>,
    #[sea_orm(column_name = "videoLocation")]
    pub video_location: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub topic: Option<i32>,
    #[sea_orm(column_name = "thumbnailLocation")]
    pub thumbnail_location: Option<String>,
    #[sea_orm(column_name = "gifLocation")]
    pub gif_location: Option<String>,
    pub published: Option<bool>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwningUser",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::channel::Entity",
        from = "Column::ChannelId",
        to = "super::channel::Column::Id",
        on_delete = "Cascade"
    )]
    Channel,
    #[sea_orm(
        belongs_to = "super::recorded_video::Entity",
        from = "Column::ParentVideo",
        to = "super::recorded_video::Column::Id",
        on_delete = "SetNull"
    )]
    RecordedVideo,
    #[sea_orm(has_many = "super::clip_upvotes::Entity")]
    Upvotes,
    #[sea_orm(has_many = "super::clip_tags::Entity")]
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

impl Related<super::recorded_video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecordedVideo.def()
    }
}

impl Related<super::clip_upvotes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Upvotes.def()
    }
}

impl Related<super::clip_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone)]
pub struct NewClip {
    pub clip_date: DateTimeUtc,
    pub video_location: String,
    pub start_time: f64,
    pub end_time: f64,
    pub clip_name: String,
    pub description: Option<String>,
}

impl NewClip {
    /// Owner, channel and topic are copied from the parent once and never
    /// re-synchronised afterwards.
    pub fn into_active_model(self, parent: &super::recorded_video::Model) -> ActiveModel {
        ActiveModel {
            uuid: Set(Some(Uuid::new_v4().to_string())),
            clip_date: Set(Some(self.clip_date)),
            parent_video: Set(Some(parent.id)),
            owning_user: Set(parent.owning_user),
            channel_id: Set(parent.channel_id),
            video_location: Set(Some(self.video_location)),
            start_time: Set(Some(self.start_time)),
            end_time: Set(Some(self.end_time)),
            description: Set(self.description),
            topic: Set(parent.topic),
            clip_name: Set(Some(self.clip_name)),
            length: Set(Some(self.end_time - self.start_time)),
            views: Set(Some(0)),
            published: Set(Some(true)),
            ..Default::default()
        }
    }
}
