pub use super::channel::Entity as Channel;
pub use super::clip_tags::Entity as ClipTags;
pub use super::clip_upvotes::Entity as ClipUpvotes;
pub use super::clips::Entity as Clips;
pub use super::guest::Entity as Guest;
pub use super::oauth2_token::Entity as OAuth2Token;
pub use super::recorded_video::Entity as RecordedVideo;
pub use super::role::Entity as Role;
pub use super::roles_users::Entity as RolesUsers;
pub use super::user::Entity as User;
pub use super::user_social::Entity as UserSocial;
pub use super::users_flagged_for_deletion::Entity as UsersFlaggedForDeletion;
pub use super::video_comments::Entity as VideoComments;
pub use super::video_tags::Entity as VideoTags;
pub use super::video_upvotes::Entity as VideoUpvotes;
