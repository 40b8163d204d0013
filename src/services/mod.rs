pub mod account_service;
pub mod email_check;
pub mod media_lifecycle;
pub mod media_store;
pub mod recaptcha;
pub mod video_service;
pub mod worker;
