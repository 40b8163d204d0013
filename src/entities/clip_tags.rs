use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clip_tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: Option<String>,
    #[sea_orm(column_name = "clipID")]
    pub clip_id: Option<i32>,
    #[sea_orm(column_name = "taggedByUser")]
    pub tagged_by_user: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clips::Entity",
        from = "Column::ClipId",
        to = "super::clips::Column::Id"
    )]
    Clip,
}

impl Related<super::clips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clip.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn new_tag(name: &str, clip_id: i32, user_id: i32) -> ActiveModel {
    ActiveModel {
        name: Set(Some(name.to_string())),
        clip_id: Set(Some(clip_id)),
        tagged_by_user: Set(Some(user_id)),
        ..Default::default()
    }
}
