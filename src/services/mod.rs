//! Business rules for every domain, one service per aggregate.
//!
//! Domain handlers reach the database only through these; multi-table writes
//! (registration rewards, payment settlement, blog tags) run in repository
//! transactions called from here.

mod ai_task_service;
pub mod analytics;
mod article_service;
mod billing_service;
mod blog_service;
mod commission_service;
mod credit_service;
mod invitation_service;
mod template_service;
mod user_service;

pub use ai_task_service::{AiTaskService, StatusReport};
pub use analytics::AnalyticsService;
pub use article_service::{
    ArticleChanges, ArticleDraft, ArticleService, PublishRequest, PublishStatus,
    render_section_html,
};
pub use billing_service::BillingService;
pub use blog_service::{
    BlogPostDetail, BlogPostInput, BlogPostPatch, BlogService, normalize_page_size,
};
pub use commission_service::{CommissionService, CommissionSummary};
pub use credit_service::CreditService;
pub use invitation_service::{InvitationInfo, InvitationService};
pub use template_service::{TemplateDraft, TemplateService};
pub use user_service::{AdminUserChanges, ProfileChanges, Registration, UserService};

use crate::cache::CacheManager;
use crate::config::Settings;
use crate::repositories::Repositories;
use crate::utils::jwt::TokenIssuer;

/// Built once per process in [`AppState`](crate::state::AppState); clones share the pool.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub credits: CreditService,
    pub billing: BillingService,
    pub ai_tasks: AiTaskService,
    pub templates: TemplateService,
    pub blog: BlogService,
    pub articles: ArticleService,
    pub invitations: InvitationService,
    pub commissions: CommissionService,
    pub analytics: AnalyticsService,
}

impl Services {
    pub fn new(repos: Repositories, tokens: TokenIssuer, cache: CacheManager, settings: &Settings) -> Self {
        let commissions = CommissionService::new(
            repos.commissions.clone(),
            repos.invitations.clone(),
            settings.invitation.commission_rate,
        );
        Self {
            users: UserService::new(
                repos.users.clone(),
                repos.invitations.clone(),
                tokens,
                settings.credits.clone(),
                settings.invitation.clone(),
            ),
            credits: CreditService::new(repos.credits.clone()),
            billing: BillingService::new(
                repos.trades.clone(),
                repos.credits.clone(),
                commissions.clone(),
            ),
            ai_tasks: AiTaskService::new(repos.ai_tasks.clone()),
            templates: TemplateService::new(repos.templates.clone()),
            blog: BlogService::new(repos.blog.clone()),
            articles: ArticleService::new(
                repos.articles.clone(),
                repos.users.clone(),
                settings.publish.simulated_delay_ms,
            ),
            invitations: InvitationService::new(
                repos.invitations.clone(),
                repos.users.clone(),
                settings.invitation.reward_credits,
                settings.invitation.code_max_attempts,
            ),
            analytics: AnalyticsService::new(
                &repos,
                cache,
                settings.billing.clone(),
                settings.analytics.clone(),
            ),
            commissions,
        }
    }
}
