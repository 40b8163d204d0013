use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "videoComments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "userID")]
    pub user_id: Option<i32>,
    pub timestamp: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    #[sea_orm(column_name = "videoID")]
    pub video_id: Option<i32>,
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
