//! Migrate command handler: apply, preview or roll back embedded migrations.

use crate::config::Settings;
use crate::db::{pending_migrations, revert_migrations, run_migrations};
use crate::error::AppResult;

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.config.database.validate()?;
        let url = self.config.database.url.clone();

        if dry_run {
            let pending = pending_migrations(url).await?;
            if pending.is_empty() {
                println!("✓ No pending migrations, database is up to date");
            } else {
                println!("Found {} pending migration(s):", pending.len());
                for name in &pending {
                    println!("  - {}", name);
                }
                println!("\nRun without --dry-run to apply them");
            }
            return Ok(());
        }

        match rollback {
            Some(steps) => {
                println!("Rolling back {} migration(s)...", steps);
                let reverted = revert_migrations(url, steps).await?;
                for version in &reverted {
                    println!("  ✓ Reverted: {}", version);
                }
                tracing::info!(count = reverted.len(), "Migrations reverted");
                println!("✓ Rolled back {} migration(s)", reverted.len());
            }
            None => {
                println!("Running database migrations...");
                let applied = run_migrations(url).await?;
                if applied.is_empty() {
                    println!("✓ No pending migrations, database is up to date");
                } else {
                    for version in &applied {
                        println!("  ✓ Applied: {}", version);
                    }
                    tracing::info!(count = applied.len(), "Migrations applied");
                    println!("✓ Applied {} migration(s)", applied.len());
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_rejects_missing_database_url() {
        let handler = MigrateCommandHandler::new(Settings::default());
        assert!(matches!(
            handler.execute(true, None).await,
            Err(AppError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_non_postgres_url() {
        let mut config = Settings::default();
        config.database.url = "mysql://localhost/inkdesk".to_string();
        let handler = MigrateCommandHandler::new(config);
        assert!(handler.execute(false, Some(1)).await.is_err());
    }
}
