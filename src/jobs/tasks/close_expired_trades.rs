use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::jobs::tasks::{check_minutes, minutes_ago};
use crate::jobs::types::{JobContext, JobTask};

/// Closes recharge orders left pending longer than `expire_minutes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseExpiredTradesTask {
    #[serde(default = "default_expire_minutes")]
    pub expire_minutes: i64,
}

fn default_expire_minutes() -> i64 {
    30
}

#[async_trait]
impl JobTask for CloseExpiredTradesTask {
    fn task_type() -> &'static str
    where
        Self: Sized,
    {
        "close_expired_trades"
    }

    async fn execute(&self, ctx: JobContext) -> AppResult<()> {
        let cutoff = minutes_ago("expire_minutes", self.expire_minutes)?;
        let closed = ctx.services.billing.close_expired(cutoff).await?;

        tracing::info!(
            closed_count = closed,
            expire_minutes = self.expire_minutes,
            "Expired trades closed"
        );

        Ok(())
    }

    fn validate(&self) -> AppResult<()> {
        check_minutes("expire_minutes", self.expire_minutes)
    }

    fn description(&self) -> Option<String> {
        Some(format!(
            "Close pending trades older than {} minutes",
            self.expire_minutes
        ))
    }
}
