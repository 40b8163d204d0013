use chrono::{Duration, Utc};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Grace period between a deletion request and the purge.
pub const DELETION_GRACE_DAYS: i64 = 2;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "UsersFlaggedForDeletion")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "userID")]
    pub user_id: Option<i32>,
    /// When the account becomes eligible for purging.
    pub timestamp: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn new_flag(user_id: i32) -> ActiveModel {
    ActiveModel {
        user_id: Set(Some(user_id)),
        timestamp: Set(Some(Utc::now() + Duration::days(DELETION_GRACE_DAYS))),
        ..Default::default()
    }
}
