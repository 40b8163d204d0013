pub mod prelude;

pub mod channel;
pub mod clip_tags;
pub mod clip_upvotes;
pub mod clips;
pub mod guest;
pub mod oauth2_token;
pub mod recorded_video;
pub mod role;
pub mod roles_users;
pub mod user;
pub mod user_social;
pub mod users_flagged_for_deletion;
pub mod video_comments;
pub mod video_tags;
pub mod video_upvotes;
