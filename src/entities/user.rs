use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Local accounts use `auth_type == 0`; anything else was provisioned through OAuth.
pub const AUTH_TYPE_LOCAL: i32 = 0;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub uuid: Option<String>,
    #[sea_orm(unique)]
    pub username: Option<String>,
    #[sea_orm(unique)]
    pub email: Option<String>,
    pub fs_uniquifier: Option<String>,
    pub tf_primary_method: Option<String>,
    pub tf_totp_secret: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub biography: Option<String>,
    pub active: Option<bool>,
    pub confirmed_at: Option<DateTimeUtc>,
    pub last_login_at: Option<DateTimeUtc>,
    pub current_login_at: Option<DateTimeUtc>,
    pub last_login_ip: Option<String>,
    pub current_login_ip: Option<String>,
    pub login_count: Option<i32>,
    #[sea_orm(column_name = "pictureLocation")]
    pub picture_location: Option<String>,
    #[sea_orm(column_name = "bannerLocation")]
    pub banner_location: Option<String>,
    #[sea_orm(column_name = "authType")]
    pub auth_type: Option<i32>,
    #[sea_orm(column_name = "oAuthID", column_type = "Text", nullable)]
    pub oauth_id: Option<String>,
    #[sea_orm(column_name = "oAuthProvider")]
    pub oauth_provider: Option<String>,
    #[sea_orm(column_name = "xmppToken")]
    pub xmpp_token: Option<String>,
    #[sea_orm(column_name = "emailVideo")]
    pub email_video: Option<bool>,
    #[sea_orm(column_name = "emailStream")]
    pub email_stream: Option<bool>,
    #[sea_orm(column_name = "emailMessage")]
    pub email_message: Option<bool>,
}

impl Model {
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::roles_users::Entity")]
    RolesUsers,
    #[sea_orm(has_many = "super::channel::Entity")]
    Channels,
    #[sea_orm(has_many = "super::clips::Entity")]
    Clips,
    #[sea_orm(has_many = "super::user_social::Entity")]
    SocialNetworks,
    #[sea_orm(has_many = "super::oauth2_token::Entity")]
    OAuthTokens,
    #[sea_orm(has_many = "super::users_flagged_for_deletion::Entity")]
    DeletionFlags,
}

impl Related<super::channel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Channels.def()
    }
}

impl Related<super::clips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clips.def()
    }
}

impl Related<super::user_social::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SocialNetworks.def()
    }
}

impl Related<super::oauth2_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OAuthTokens.def()
    }
}

impl Related<super::users_flagged_for_deletion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeletionFlags.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        super::roles_users::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::roles_users::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
