//! HTTP request handlers for API endpoints.
//!
//! Each module exposes `*_routes()` builders; `routes.rs` decides which
//! authentication layer wraps them.

pub mod ai_tasks;
pub mod analytics;
pub mod articles;
pub mod auth;
pub mod blog;
pub mod credits;
pub mod health;
pub mod invitations;
pub mod me;
pub mod templates;
pub mod trades;
pub mod users;
