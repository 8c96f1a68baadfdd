//! Repository layer for data access operations.
//!
//! Each repository owns a clone of the pool. Multi-table writes run inside a
//! single transaction on one connection.

mod ai_task_repo;
mod article_repo;
mod blog_repo;
mod commission_repo;
mod credit_repo;
mod invitation_repo;
mod template_repo;
mod trade_repo;
mod user_repo;

pub use ai_task_repo::AiTaskRepository;
pub use article_repo::ArticleRepository;
pub use blog_repo::{BlogFilter, BlogRepository, BlogSort, BlogStats};
pub use commission_repo::CommissionRepository;
pub use credit_repo::CreditRepository;
pub use invitation_repo::InvitationRepository;
pub use template_repo::{TemplateFilter, TemplateRepository};
pub use trade_repo::{PaidTrade, PaymentTransition, TradeRepository};
pub use user_repo::{SignupGrant, UserRepository};

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
#[derive(Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub credits: CreditRepository,
    pub trades: TradeRepository,
    pub ai_tasks: AiTaskRepository,
    pub templates: TemplateRepository,
    pub blog: BlogRepository,
    pub articles: ArticleRepository,
    pub invitations: InvitationRepository,
    pub commissions: CommissionRepository,
}

impl Repositories {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            credits: CreditRepository::new(pool.clone()),
            trades: TradeRepository::new(pool.clone()),
            ai_tasks: AiTaskRepository::new(pool.clone()),
            templates: TemplateRepository::new(pool.clone()),
            blog: BlogRepository::new(pool.clone()),
            articles: ArticleRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone()),
            commissions: CommissionRepository::new(pool),
        }
    }
}

/// `ILIKE` pattern matching `keyword` anywhere. `%`, `_` and backslashes in
/// the keyword match literally; backslash is the default escape in Postgres.
pub(crate) fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_wraps_keyword() {
        assert_eq!(contains_pattern("rust"), "%rust%");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }
}
