use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler as TokioCronScheduler};
use tokio_util::sync::CancellationToken;

use crate::config::{JobDefinition, JobsConfig};
use crate::error::{AppError, AppResult};
use crate::jobs::executor::{JobExecutor, RetryPolicy};
use crate::jobs::registry::JobRegistry;
use crate::services::Services;

/// Wrapper around tokio-cron-scheduler driven by the `[jobs]` config section
pub struct JobScheduler {
    scheduler: Arc<Mutex<TokioCronScheduler>>,
    executor: Arc<JobExecutor>,
    registry: Arc<JobRegistry>,
    definitions: Vec<JobDefinition>,
    shutdown: CancellationToken,
}

impl JobScheduler {
    pub async fn new(config: &JobsConfig, services: Services, registry: JobRegistry) -> AppResult<Self> {
        let scheduler = TokioCronScheduler::new()
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?;

        Ok(Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            executor: Arc::new(JobExecutor::new(services, RetryPolicy::from(config))),
            registry: Arc::new(registry),
            definitions: config.tasks.clone(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Schedule every enabled definition, then start ticking.
    ///
    /// An unknown task type or a bad cron expression fails startup rather
    /// than silently dropping the job.
    pub async fn start(&self) -> AppResult<()> {
        for definition in self.definitions.iter().filter(|d| d.enabled) {
            self.schedule_job(definition.clone()).await?;
        }

        self.scheduler
            .lock()
            .await
            .start()
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?;
        tracing::info!(
            job_count = self.definitions.iter().filter(|d| d.enabled).count(),
            "Job scheduler started"
        );
        Ok(())
    }

    /// Stop the scheduler gracefully
    pub async fn stop(&self) -> AppResult<()> {
        self.shutdown.cancel();
        self.scheduler
            .lock()
            .await
            .shutdown()
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?;
        tracing::info!("Job scheduler stopped");
        Ok(())
    }

    async fn schedule_job(&self, definition: JobDefinition) -> AppResult<()> {
        if !self.registry.is_registered(&definition.task_type) {
            return Err(AppError::not_found(
                "job_types",
                "task_type",
                &definition.task_type,
            ));
        }

        let executor = Arc::clone(&self.executor);
        let registry = Arc::clone(&self.registry);
        let shutdown = self.shutdown.clone();
        let job_definition = definition.clone();

        let cron_job = Job::new_async(definition.cron.as_str(), move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let registry = Arc::clone(&registry);
            let shutdown = shutdown.clone();
            let job = job_definition.clone();

            Box::pin(async move {
                match registry.create_task(&job.task_type, job.payload.clone()) {
                    Ok(task) => {
                        if let Err(e) = executor.execute_job(&job.name, task, shutdown).await {
                            tracing::error!(job_name = %job.name, error = %e, "Job execution failed");
                        }
                    }
                    Err(e) => {
                        tracing::error!(job_name = %job.name, error = %e, "Failed to create task");
                    }
                }
            })
        })
        .map_err(|e| AppError::Validation {
            field: format!("jobs.tasks.{}.cron", definition.name),
            reason: format!("Invalid cron expression: {}", e),
        })?;

        self.scheduler
            .lock()
            .await
            .add(cron_job)
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?;

        tracing::info!(
            job_name = %definition.name,
            task_type = %definition.task_type,
            cron = %definition.cron,
            "Job scheduled"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::test_support::offline_state;

    fn definition(task_type: &str, cron: &str) -> JobDefinition {
        JobDefinition {
            name: "test-job".to_string(),
            task_type: task_type.to_string(),
            cron: cron.to_string(),
            payload: json!({}),
            enabled: true,
        }
    }

    async fn scheduler_with(tasks: Vec<JobDefinition>) -> JobScheduler {
        let config = JobsConfig {
            enabled: true,
            tasks,
            ..JobsConfig::default()
        };
        JobScheduler::new(&config, offline_state().services, JobRegistry::with_builtin_tasks())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_task_type_fails_start() {
        let scheduler = scheduler_with(vec![definition("nope", "0 * * * * *")]).await;
        assert!(matches!(
            scheduler.start().await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_bad_cron_fails_start() {
        let scheduler = scheduler_with(vec![definition("close_expired_trades", "every minute")]).await;
        assert!(matches!(
            scheduler.start().await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_disabled_definitions_are_ignored() {
        let mut disabled = definition("nope", "not a cron");
        disabled.enabled = false;
        let scheduler = scheduler_with(vec![disabled]).await;
        scheduler.start().await.unwrap();
        scheduler.stop().await.unwrap();
    }
}
