use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::JobsConfig;
use crate::error::{AppError, AppResult};
use crate::jobs::types::{JobContext, JobTask};
use crate::services::Services;

/// Tracks running jobs in memory so a slow run is never overlapped by the
/// next tick of the same job.
#[derive(Clone, Default)]
pub struct ConcurrencyTracker {
    running: Arc<Mutex<HashSet<String>>>,
}

impl ConcurrencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `job_name` running; false when it already is.
    pub async fn try_start(&self, job_name: &str) -> bool {
        self.running.lock().await.insert(job_name.to_string())
    }

    pub async fn finish(&self, job_name: &str) {
        self.running.lock().await.remove(job_name);
    }
}

/// Timeout and retry settings shared by every job.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Delay before retry number `attempt + 1`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.max(1.0).powi(attempt as i32);
        self.retry_delay.mul_f64(factor)
    }
}

impl From<&JobsConfig> for RetryPolicy {
    fn from(config: &JobsConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.job_timeout),
            max_retries: config.max_retries,
            retry_delay: Duration::from_secs(config.retry_delay),
            backoff_multiplier: config.retry_backoff_multiplier,
        }
    }
}

/// Executes jobs with retry, timeout, and concurrency control
pub struct JobExecutor {
    services: Services,
    policy: RetryPolicy,
    concurrency: ConcurrencyTracker,
}

impl JobExecutor {
    pub fn new(services: Services, policy: RetryPolicy) -> Self {
        Self {
            services,
            policy,
            concurrency: ConcurrencyTracker::new(),
        }
    }

    /// Runs one scheduled tick. A tick that finds the previous run still
    /// active is skipped.
    pub async fn execute_job(
        &self,
        job_name: &str,
        task: Box<dyn JobTask>,
        cancellation_token: CancellationToken,
    ) -> AppResult<()> {
        if !self.concurrency.try_start(job_name).await {
            tracing::warn!(job_name, "Previous run still active, skipping");
            return Ok(());
        }

        let result = self
            .execute_with_retry(job_name, task.as_ref(), cancellation_token)
            .await;
        self.concurrency.finish(job_name).await;

        result
    }

    async fn execute_with_retry(
        &self,
        job_name: &str,
        task: &dyn JobTask,
        cancellation_token: CancellationToken,
    ) -> AppResult<()> {
        let mut last_error = None;

        for attempt in 0..=self.policy.max_retries {
            let run_id = Uuid::new_v4();
            let start_time = Instant::now();

            let ctx = JobContext {
                run_id,
                job_name: job_name.to_string(),
                retry_attempt: attempt,
                services: self.services.clone(),
                cancellation_token: cancellation_token.clone(),
            };

            let result = tokio::time::timeout(self.policy.timeout, task.execute(ctx)).await;
            let duration_ms = start_time.elapsed().as_millis() as u64;

            match result {
                Ok(Ok(())) => {
                    tracing::info!(job_name, %run_id, attempt, duration_ms, "Job succeeded");
                    return Ok(());
                }
                Ok(Err(e)) => {
                    tracing::warn!(job_name, %run_id, attempt, duration_ms, error = %e, "Job attempt failed");
                    last_error = Some(e.to_string());

                    if attempt < self.policy.max_retries {
                        let delay = self.policy.delay_for(attempt);
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => {}
                            _ = cancellation_token.cancelled() => {
                                tracing::info!(job_name, "Retry abandoned on shutdown");
                                break;
                            }
                        }
                    }
                }
                Err(_) => {
                    tracing::error!(
                        job_name,
                        %run_id,
                        timeout_secs = self.policy.timeout.as_secs(),
                        "Job timed out"
                    );
                    return Err(AppError::Internal {
                        source: anyhow::anyhow!(
                            "Job timeout after {}s",
                            self.policy.timeout.as_secs()
                        ),
                    });
                }
            }
        }

        Err(AppError::Internal {
            source: anyhow::anyhow!(
                "Job execution failed: {}",
                last_error.unwrap_or_else(|| "Unknown error".to_string())
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::state::test_support::offline_state;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_millis(200),
            max_retries,
            retry_delay: Duration::ZERO,
            backoff_multiplier: 2.0,
        }
    }

    /// Fails until `succeed_on` attempts have been made.
    #[derive(Debug)]
    struct FlakyTask {
        calls: Arc<AtomicU32>,
        succeed_on: u32,
    }

    #[async_trait]
    impl JobTask for FlakyTask {
        fn task_type() -> &'static str {
            "flaky"
        }

        async fn execute(&self, _ctx: JobContext) -> AppResult<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.succeed_on {
                Ok(())
            } else {
                Err(AppError::bad_request("not yet"))
            }
        }
    }

    #[derive(Debug)]
    struct SlowTask;

    #[async_trait]
    impl JobTask for SlowTask {
        fn task_type() -> &'static str {
            "slow"
        }

        async fn execute(&self, _ctx: JobContext) -> AppResult<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    fn flaky(succeed_on: u32) -> (Box<dyn JobTask>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let task = FlakyTask {
            calls: calls.clone(),
            succeed_on,
        };
        (Box::new(task), calls)
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let policy = RetryPolicy {
            retry_delay: Duration::from_secs(10),
            ..policy(3)
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(10));
        assert_eq!(policy.delay_for(1), Duration::from_secs(20));
        assert_eq!(policy.delay_for(2), Duration::from_secs(40));
    }

    #[test]
    fn test_policy_from_config() {
        let config = JobsConfig {
            job_timeout: 120,
            max_retries: 2,
            retry_delay: 5,
            retry_backoff_multiplier: 3.0,
            ..JobsConfig::default()
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.timeout, Duration::from_secs(120));
        assert_eq!(policy.delay_for(1), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let executor = JobExecutor::new(offline_state().services, policy(3));
        let (task, calls) = flaky(3);
        executor
            .execute_job("flaky", task, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let executor = JobExecutor::new(offline_state().services, policy(1));
        let (task, calls) = flaky(10);
        let result = executor
            .execute_job("flaky", task, CancellationToken::new())
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let executor = JobExecutor::new(offline_state().services, policy(3));
        let result = executor
            .execute_job("slow", Box::new(SlowTask), CancellationToken::new())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_concurrency_tracker_blocks_second_run() {
        let tracker = ConcurrencyTracker::new();
        assert!(tracker.try_start("job").await);
        assert!(!tracker.try_start("job").await);
        assert!(tracker.try_start("other").await);
        tracker.finish("job").await;
        assert!(tracker.try_start("job").await);
    }
}
