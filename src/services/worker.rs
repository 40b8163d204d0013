use crate::services::account_service::AccountService;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, sleep};

pub struct BackgroundWorker {
    accounts: Arc<AccountService>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl BackgroundWorker {
    pub fn new(
        accounts: Arc<AccountService>,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            accounts,
            interval,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            "🚀 Background worker started (purge every {:?})",
            self.interval
        );

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    tracing::info!("🛑 Background worker shutting down");
                    break;
                }
                _ = sleep(self.interval) => {
                    self.purge_flagged_accounts().await;
                }
            }
        }
    }

    pub async fn purge_flagged_accounts(&self) {
        tracing::info!("🧹 Purging accounts flagged for deletion...");

        match self.accounts.purge_due_accounts().await {
            Ok(reports) if reports.is_empty() => {
                tracing::debug!("No accounts due for deletion");
            }
            Ok(reports) => {
                let files: usize = reports.iter().map(|r| r.files_removed).sum();
                tracing::info!(
                    "✅ Purged {} account(s), {} media file(s) removed",
                    reports.len(),
                    files
                );
            }
            Err(e) => tracing::error!("Account purge failed: {:?}", e),
        }
    }
}
