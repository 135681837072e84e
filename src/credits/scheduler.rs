use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::error;

use crate::credits::CreditLedger;

/// Runs the daily-reset check on a fixed period. The first check happens
/// immediately. Dropping the handle stops the task.
pub struct ResetScheduler {
    handle: JoinHandle<()>,
}

impl ResetScheduler {
    pub fn spawn(ledger: Arc<RwLock<CreditLedger>>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if let Err(e) = ledger.write().await.check_and_reset_credits() {
                    error!("Scheduled credit check failed: {}", e);
                }
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ResetScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
