use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{AppError, AppResult};
use crate::jobs::tasks::{CloseExpiredTradesTask, FailStaleAiTasksTask};
use crate::jobs::types::JobTask;

type TaskFactory = Box<dyn Fn(JsonValue) -> AppResult<Box<dyn JobTask>> + Send + Sync>;

/// Registry for mapping job types to task implementations
pub struct JobRegistry {
    factories: HashMap<String, TaskFactory>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with every built-in maintenance task.
    pub fn with_builtin_tasks() -> Self {
        let mut registry = Self::new();
        registry
            .register::<CloseExpiredTradesTask>()
            .register::<FailStaleAiTasksTask>();
        registry
    }

    /// Register a task type with the registry
    pub fn register<T>(&mut self) -> &mut Self
    where
        T: JobTask + DeserializeOwned + 'static,
    {
        let factory: TaskFactory = Box::new(|payload: JsonValue| {
            let task: T = serde_json::from_value(payload).map_err(|e| AppError::Validation {
                field: "payload".to_string(),
                reason: format!("invalid payload for {}: {}", T::task_type(), e),
            })?;
            task.validate()?;
            Ok(Box::new(task) as Box<dyn JobTask>)
        });

        self.factories.insert(T::task_type().to_string(), factory);
        self
    }

    /// Create a task instance from job type and payload
    pub fn create_task(&self, task_type: &str, payload: JsonValue) -> AppResult<Box<dyn JobTask>> {
        let factory = self
            .factories
            .get(task_type)
            .ok_or_else(|| AppError::not_found("job_types", "task_type", task_type))?;

        factory(payload)
    }

    pub fn is_registered(&self, task_type: &str) -> bool {
        self.factories.contains_key(task_type)
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::with_builtin_tasks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_tasks_registered() {
        let registry = JobRegistry::with_builtin_tasks();
        assert!(registry.is_registered("close_expired_trades"));
        assert!(registry.is_registered("fail_stale_ai_tasks"));
        assert!(!registry.is_registered("data_cleanup"));
    }

    #[test]
    fn test_create_task_applies_payload_defaults() {
        let registry = JobRegistry::with_builtin_tasks();
        let task = registry.create_task("close_expired_trades", json!({})).unwrap();
        assert_eq!(
            task.description().as_deref(),
            Some("Close pending trades older than 30 minutes")
        );

        let task = registry
            .create_task("fail_stale_ai_tasks", json!({ "stale_minutes": 15 }))
            .unwrap();
        assert_eq!(
            task.description().as_deref(),
            Some("Fail AI tasks stuck for more than 15 minutes")
        );
    }

    #[test]
    fn test_out_of_range_minutes_rejected() {
        let registry = JobRegistry::with_builtin_tasks();
        for payload in [
            json!({ "expire_minutes": 0 }),
            json!({ "expire_minutes": -5 }),
            json!({ "expire_minutes": i64::MAX }),
        ] {
            assert!(matches!(
                registry.create_task("close_expired_trades", payload),
                Err(AppError::Validation { ref field, .. }) if field == "expire_minutes"
            ));
        }
        assert!(matches!(
            registry.create_task("fail_stale_ai_tasks", json!({ "stale_minutes": i64::MIN })),
            Err(AppError::Validation { ref field, .. }) if field == "stale_minutes"
        ));
    }

    #[test]
    fn test_unknown_type_and_bad_payload() {
        let registry = JobRegistry::with_builtin_tasks();
        assert!(matches!(
            registry.create_task("nope", json!({})),
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            registry.create_task("close_expired_trades", json!({ "expire_minutes": "soon" })),
            Err(AppError::Validation { .. })
        ));
    }
}
