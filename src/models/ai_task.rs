use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::AiTaskType")]
#[serde(rename_all = "snake_case")]
pub enum AiTaskType {
    Format,
    Rewrite,
    TopicPolish,
    Article,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::AiTaskStatus")]
#[serde(rename_all = "snake_case")]
pub enum AiTaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl AiTaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AiTaskStatus::Completed | AiTaskStatus::Failed)
    }

    /// pending -> running | failed, running -> completed | failed.
    pub fn can_transition_to(self, next: AiTaskStatus) -> bool {
        use AiTaskStatus::*;
        matches!(
            (self, next),
            (Pending, Running) | (Pending, Failed) | (Running, Completed) | (Running, Failed)
        )
    }
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::ai_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AiTask {
    pub id: Uuid,
    pub user_id: String,
    pub task_type: AiTaskType,
    pub input: String,
    pub output: Option<String>,
    pub status: AiTaskStatus,
    pub tokens: Option<i32>,
    pub model_version: Option<String>,
    pub error_log: Option<JsonValue>,
    pub credits_cost: i32,
    pub is_public: bool,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::ai_tasks)]
pub struct NewAiTask {
    pub id: Uuid,
    pub user_id: String,
    pub task_type: AiTaskType,
    pub input: String,
    pub status: AiTaskStatus,
    pub credits_cost: i32,
    pub is_public: bool,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::ai_tasks)]
pub struct UpdateAiTask {
    pub status: Option<AiTaskStatus>,
    pub output: Option<String>,
    pub tokens: Option<i32>,
    pub model_version: Option<String>,
    pub error_log: Option<JsonValue>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::AiTaskStatus::*;

    #[test]
    fn test_legal_transitions() {
        assert!(Pending.can_transition_to(Running));
        assert!(Pending.can_transition_to(Failed));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Failed));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Running.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Running));
        assert!(!Running.can_transition_to(Running));
    }

    #[test]
    fn test_terminal_states() {
        assert!(Completed.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Pending.is_terminal());
    }
}
