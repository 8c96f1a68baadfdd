//! Cron-driven maintenance jobs declared under `[[jobs.tasks]]`.
//!
//! ```toml
//! [jobs]
//! enabled = true
//!
//! [[jobs.tasks]]
//! name = "close-expired-trades"
//! task_type = "close_expired_trades"
//! cron = "0 */5 * * * *"
//! payload = { expire_minutes = 30 }
//! ```

pub mod executor;
pub mod registry;
pub mod scheduler;
pub mod tasks;
pub mod types;

pub use executor::{ConcurrencyTracker, JobExecutor, RetryPolicy};
pub use registry::JobRegistry;
pub use scheduler::JobScheduler;
pub use types::{JobContext, JobTask};
