use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// `Ok(false)` means the challenge was answered wrongly or replayed.
    async fn verify(&self, response: &str, remote_ip: Option<&str>) -> Result<bool>;
}

#[derive(Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: String,
}

impl RecaptchaVerifier {
    pub fn new(secret: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret,
        }
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, response: &str, remote_ip: Option<&str>) -> Result<bool> {
        let mut form = vec![("secret", self.secret.as_str()), ("response", response)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let body: SiteVerifyResponse = self
            .client
            .post(SITEVERIFY_URL)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !body.success {
            tracing::debug!("reCAPTCHA rejected: {:?}", body.error_codes);
        }

        Ok(body.success)
    }
}
