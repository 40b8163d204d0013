use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: Option<String>,
    pub description: Option<String>,
    /// Stored as a comma separated list.
    #[sea_orm(column_type = "Text", nullable)]
    pub permissions: Option<String>,
    #[sea_orm(column_name = "default")]
    pub is_default: Option<bool>,
}

impl Model {
    pub fn permission_list(&self) -> Vec<String> {
        parse_permissions(self.permissions.as_deref())
    }
}

pub fn parse_permissions(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_permissions(permissions: &[&str]) -> Option<String> {
    if permissions.is_empty() {
        None
    } else {
        Some(permissions.join(","))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::roles_users::Entity")]
    RolesUsers,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::roles_users::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::roles_users::Relation::Role.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
