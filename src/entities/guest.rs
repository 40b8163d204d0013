use chrono::Utc;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Guest")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "UUID")]
    pub guest_uuid: Option<String>,
    pub last_active_at: Option<DateTimeUtc>,
    pub last_active_ip: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn new_guest(guest_uuid: &str, ip: Option<String>) -> ActiveModel {
    ActiveModel {
        guest_uuid: Set(Some(guest_uuid.to_string())),
        last_active_at: Set(Some(Utc::now())),
        last_active_ip: Set(ip),
        ..Default::default()
    }
}
