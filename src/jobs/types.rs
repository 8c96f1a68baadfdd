use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::Services;

/// Job execution context passed to tasks
#[derive(Clone)]
pub struct JobContext {
    /// Identifies one attempt in the logs
    pub run_id: Uuid,
    pub job_name: String,
    pub retry_attempt: u32,
    pub services: Services,
    /// Cancelled when the scheduler shuts down
    pub cancellation_token: CancellationToken,
}

/// Trait that all job tasks must implement
#[async_trait]
pub trait JobTask: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this task type, matched against `task_type` in config
    fn task_type() -> &'static str
    where
        Self: Sized;

    async fn execute(&self, ctx: JobContext) -> AppResult<()>;

    /// Checks payload values once the task has been deserialized.
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }

    fn description(&self) -> Option<String> {
        None
    }
}
