use crate::config::AppConfig;
use crate::services::email_check::{AcceptAllEmails, DnsEmailChecker, EmailDeliverability};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub fn setup_email_checker(config: &AppConfig) -> Arc<dyn EmailDeliverability> {
    if !config.email_dns_check {
        tracing::warn!("⚠️  Email DNS check disabled; registrations accept any domain");
        return Arc::new(AcceptAllEmails);
    }

    let timeout = Duration::from_secs(config.email_dns_timeout_secs);
    info!("📧 Email DNS check enabled (timeout {:?})", timeout);
    Arc::new(DnsEmailChecker::new(timeout))
}
