use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Channel")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "owningUser")]
    pub owning_user: Option<i32>,
    #[sea_orm(column_name = "channelName")]
    pub channel_name: Option<String>,
    #[sea_orm(column_name = "channelLoc")]
    pub channel_loc: Option<String>,
    pub topic: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwningUser",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::recorded_video::Entity")]
    RecordedVideos,
    #[sea_orm(has_many = "super::clips::Entity")]
    Clips,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::recorded_video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecordedVideos.def()
    }
}

impl Related<super::clips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
