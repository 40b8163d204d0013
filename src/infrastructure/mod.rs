pub mod captcha;
pub mod database;
pub mod email;
