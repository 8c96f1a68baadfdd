use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::jobs::tasks::{check_minutes, minutes_ago};
use crate::jobs::types::{JobContext, JobTask};

/// Fails AI tasks stuck in pending or running for `stale_minutes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailStaleAiTasksTask {
    #[serde(default = "default_stale_minutes")]
    pub stale_minutes: i64,
}

fn default_stale_minutes() -> i64 {
    60
}

#[async_trait]
impl JobTask for FailStaleAiTasksTask {
    fn task_type() -> &'static str
    where
        Self: Sized,
    {
        "fail_stale_ai_tasks"
    }

    async fn execute(&self, ctx: JobContext) -> AppResult<()> {
        let cutoff = minutes_ago("stale_minutes", self.stale_minutes)?;
        let failed = ctx.services.ai_tasks.fail_stale(cutoff).await?;

        if failed > 0 {
            tracing::warn!(
                failed_count = failed,
                stale_minutes = self.stale_minutes,
                "Stale AI tasks marked failed"
            );
        }

        Ok(())
    }

    fn validate(&self) -> AppResult<()> {
        check_minutes("stale_minutes", self.stale_minutes)
    }

    fn description(&self) -> Option<String> {
        Some(format!(
            "Fail AI tasks stuck for more than {} minutes",
            self.stale_minutes
        ))
    }
}
