//! Cancellable auto-verification loop
//!
//! The dashboard used to re-check DNS from a UI timer. Here the caller owns
//! an explicit task handle instead; dropping the handle stops the loop.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::services::DomainLifecycleService;

/// Default delay between two checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default number of checks before giving up (one hour at the default interval)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;

/// Shortest accepted delay between two checks
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How a polling task ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum PollOutcome {
    Verified,
    Cancelled,
    Exhausted,
    Failed(String),
}

/// Starts verification polling tasks for accounts.
#[derive(Clone)]
pub struct VerificationPoller {
    service: Arc<DomainLifecycleService>,
    interval: Duration,
    max_attempts: u32,
}

impl VerificationPoller {
    #[must_use]
    pub fn new(service: Arc<DomainLifecycleService>) -> Self {
        Self {
            service,
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Delay between checks, at least [`MIN_POLL_INTERVAL`].
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Spawn a polling task. The first check runs immediately.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(&self, account_id: &str) -> PollHandle {
        self.start_with_cancellation(account_id, CancellationToken::new())
    }

    /// Like [`start`](Self::start), stopping as well when `token` is cancelled.
    #[must_use]
    pub fn start_with_cancellation(&self, account_id: &str, token: CancellationToken) -> PollHandle {
        let service = Arc::clone(&self.service);
        let account_id = account_id.to_string();
        let interval = self.interval;
        let max_attempts = self.max_attempts;
        let shutdown = token.clone();

        log::debug!(
            "Starting verification polling for account {account_id} every {}s, at most {max_attempts} checks",
            interval.as_secs()
        );

        let task = tokio::spawn(async move {
            let outcome = poll_loop(&service, &account_id, interval, max_attempts, &shutdown).await;
            log::info!("Verification polling for account {account_id} ended: {outcome:?}");
            outcome
        });

        PollHandle {
            token,
            task: Some(task),
        }
    }
}

async fn poll_loop(
    service: &DomainLifecycleService,
    account_id: &str,
    interval: Duration,
    max_attempts: u32,
    shutdown: &CancellationToken,
) -> PollOutcome {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for attempt in 1..=max_attempts {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => return PollOutcome::Cancelled,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            () = shutdown.cancelled() => return PollOutcome::Cancelled,
            result = service.verify_domain(account_id) => result,
        };

        match result {
            Ok(result) if result.verified => return PollOutcome::Verified,
            Ok(result) => {
                log::debug!(
                    "Check {attempt}/{max_attempts} for account {account_id}: {:?}",
                    result.status
                );
            }
            Err(e) if e.is_retryable() => {
                log::warn!("Check {attempt}/{max_attempts} for account {account_id} failed: {e}");
            }
            Err(e) => return PollOutcome::Failed(e.to_string()),
        }
    }
    PollOutcome::Exhausted
}

/// Owner handle of a polling task. Dropping it cancels the task.
pub struct PollHandle {
    token: CancellationToken,
    task: Option<JoinHandle<PollOutcome>>,
}

impl PollHandle {
    /// Request the task to stop; it ends with `Cancelled` unless already done.
    pub fn stop(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the task to end.
    pub async fn join(mut self) -> PollOutcome {
        let Some(task) = self.task.take() else {
            return PollOutcome::Cancelled;
        };
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => PollOutcome::Failed(format!("polling task aborted: {e}")),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
