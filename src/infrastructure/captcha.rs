use crate::config::AppConfig;
use crate::services::recaptcha::{CaptchaVerifier, RecaptchaVerifier};
use std::sync::Arc;
use tracing::info;

pub fn setup_captcha(config: &AppConfig) -> Option<Arc<dyn CaptchaVerifier>> {
    if !config.recaptcha_enabled {
        info!("🤖 reCAPTCHA disabled");
        return None;
    }

    match &config.recaptcha_secret_key {
        Some(secret) if !secret.is_empty() => {
            info!("🤖 reCAPTCHA enabled");
            Some(Arc::new(RecaptchaVerifier::new(secret.clone())))
        }
        _ => {
            tracing::warn!(
                "⚠️  RECAPTCHA_ENABLED is set but RECAPTCHA_SECRET_KEY is missing; skipping captcha"
            );
            None
        }
    }
}
