use std::env;
use std::path::PathBuf;

/// Runtime configuration for the media and account service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Media root; video assets live under `<media_root>/videos/` (default: "/var/www/")
    pub media_root: PathBuf,

    /// JWT Secret Key (Required in production)
    pub jwt_secret: String,

    /// Bearer token lifetime in hours (default: 24)
    pub token_ttl_hours: i64,

    /// Require a reCAPTCHA response on registration (default: false)
    pub recaptcha_enabled: bool,
    /// reCAPTCHA site key handed to the front-end
    pub recaptcha_site_key: Option<String>,
    /// reCAPTCHA secret key used for server-side verification
    pub recaptcha_secret_key: Option<String>,

    /// Check that registration email domains accept mail (default: true)
    pub email_dns_check: bool,

    /// DNS resolver timeout for the email check in seconds (default: 10)
    pub email_dns_timeout_secs: u64,

    /// How often the background worker purges accounts due for deletion (default: 3600)
    pub purge_interval_secs: u64,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("/var/www/"),
            jwt_secret: "secret".to_string(),
            token_ttl_hours: 24,
            recaptcha_enabled: false,
            recaptcha_site_key: None,
            recaptcha_secret_key: None,
            email_dns_check: true,
            email_dns_timeout_secs: 10,
            purge_interval_secs: 3600,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| {
            let v = v.to_lowercase();
            v == "true" || v == "1"
        })
        .unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.media_root),

            // Fallback for dev convenience, strictly enforced in production()
            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            token_ttl_hours: env_parse("TOKEN_TTL_HOURS", default.token_ttl_hours),

            recaptcha_enabled: env_flag("RECAPTCHA_ENABLED", default.recaptcha_enabled),
            recaptcha_site_key: env::var("RECAPTCHA_SITE_KEY").ok(),
            recaptcha_secret_key: env::var("RECAPTCHA_SECRET_KEY").ok(),

            email_dns_check: env_flag("EMAIL_DNS_CHECK", default.email_dns_check),
            email_dns_timeout_secs: env_parse(
                "EMAIL_DNS_TIMEOUT_SECS",
                default.email_dns_timeout_secs,
            ),

            purge_interval_secs: env_parse("PURGE_INTERVAL_SECS", default.purge_interval_secs),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (no DNS checks, no captcha)
    pub fn development() -> Self {
        Self {
            media_root: env::temp_dir().join("osp-media"),
            email_dns_check: false,
            recaptcha_enabled: false,
            ..Self::default()
        }
    }

    /// Create config for production; JWT_SECRET must be set
    pub fn production() -> Self {
        let from_env = Self::from_env();
        Self {
            jwt_secret: env::var("JWT_SECRET").expect("CRITICAL: JWT_SECRET must be set"),
            ..from_env
        }
    }

    /// Directory holding `{name}.mp4/.png/.gif` triples.
    pub fn videos_root(&self) -> PathBuf {
        self.media_root.join("videos")
    }
}
