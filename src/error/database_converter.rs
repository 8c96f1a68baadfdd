use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

use crate::error::{AppError, ConstraintParser};

/// Maps diesel errors onto structured [`AppError`] variants.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a diesel error, keeping `operation` as context for the
    /// variants that fall through to [`AppError::Database`].
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let constraint = info.constraint_name();

        let converted = match kind {
            DatabaseErrorKind::UniqueViolation => {
                ConstraintParser::parse_unique_violation(message, constraint).map(
                    |(entity, field, value)| AppError::Duplicate {
                        entity,
                        field,
                        value,
                    },
                )
            }
            DatabaseErrorKind::NotNullViolation => {
                ConstraintParser::parse_not_null_violation(message, constraint).map(
                    |(entity, field)| AppError::Validation {
                        field,
                        reason: format!("Field is required for {}", entity),
                    },
                )
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                ConstraintParser::parse_foreign_key_violation(message, constraint).map(
                    |(entity, field, value)| AppError::Validation {
                        field,
                        reason: format!("Invalid reference from {} with value '{}'", entity, value),
                    },
                )
            }
            DatabaseErrorKind::CheckViolation => {
                ConstraintParser::parse_check_violation(message, constraint).map(
                    |(entity, field)| AppError::Validation {
                        field,
                        reason: format!("Check constraint failed for {}", entity),
                    },
                )
            }
            _ => None,
        };

        converted.unwrap_or_else(|| AppError::Database {
            operation: operation.to_string(),
            source: anyhow::Error::msg(format!("{:?}: {}", kind, message)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeErrorInfo {
        message: String,
        constraint_name: Option<String>,
    }

    impl DatabaseErrorInformation for FakeErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint_name.as_deref()
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, message: &str, constraint: Option<&str>) -> DieselError {
        DieselError::DatabaseError(
            kind,
            Box::new(FakeErrorInfo {
                message: message.to_string(),
                constraint_name: constraint.map(str::to_string),
            }),
        )
    }

    #[test]
    fn test_duplicate_slug_becomes_duplicate() {
        let err = db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint \"blog_posts_slug_key\"\nDETAIL: Key (slug)=(launch) already exists.",
            Some("blog_posts_slug_key"),
        );

        match DatabaseErrorConverter::convert_diesel_error(err, "insert blog post") {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "blog_posts");
                assert_eq!(field, "slug");
                assert_eq!(value, "launch");
            }
            other => panic!("expected Duplicate, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_key_becomes_validation() {
        let err = db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "insert or update on table \"ai_tasks\" violates foreign key constraint \"ai_tasks_user_id_fkey\"\nDETAIL: Key (user_id)=(u_404) is not present in table \"users\".",
            Some("ai_tasks_user_id_fkey"),
        );

        match DatabaseErrorConverter::convert_diesel_error(err, "insert ai task") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "user_id");
                assert!(reason.contains("u_404"));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_violation_falls_back_to_database() {
        let err = db_error(DatabaseErrorKind::UniqueViolation, "opaque", None);
        assert!(matches!(
            DatabaseErrorConverter::convert_diesel_error(err, "insert"),
            AppError::Database { .. }
        ));
    }

    #[test]
    fn test_serialization_failure_is_database_error() {
        let err = db_error(
            DatabaseErrorKind::SerializationFailure,
            "could not serialize access",
            None,
        );
        match DatabaseErrorConverter::convert_diesel_error(err, "update credits") {
            AppError::Database { operation, .. } => assert_eq!(operation, "update credits"),
            other => panic!("expected Database, got {:?}", other),
        }
    }
}
