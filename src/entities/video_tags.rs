use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video_tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: Option<String>,
    #[sea_orm(column_name = "videoID")]
    pub video_id: Option<i32>,
    #[sea_orm(column_name = "taggedByUser")]
    pub tagged_by_user: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recorded_video::Entity",
        from = "Column::VideoId",
        to = "super::recorded_video::Column::Id"
    )]
    RecordedVideo,
}

impl Related<super::recorded_video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecordedVideo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn new_tag(name: &str, video_id: i32, user_id: i32) -> ActiveModel {
    ActiveModel {
        name: Set(Some(name.to_string())),
        video_id: Set(Some(video_id)),
        tagged_by_user: Set(Some(user_id)),
        ..Default::default()
    }
}
