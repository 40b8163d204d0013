use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clipUpvotes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "userID")]
    pub user_id: Option<i32>,
    #[sea_orm(column_name = "clipID")]
    pub clip_id: Option<i32>,
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
