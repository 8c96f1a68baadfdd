//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain. Model rows are never serialized directly;
//! each response type converts from its row with `From`.

mod ai_task;
mod analytics;
mod article;
mod auth;
mod blog;
mod credit;
mod error;
mod health;
mod invitation;
mod pagination;
mod template;
mod trade;
mod user;

pub use ai_task::{AiTaskQuery, AiTaskResponse, CreateAiTaskRequest, UpdateAiTaskStatusRequest};
pub use analytics::{DateRangeQuery, LeaderboardQuery, RankingQuery, TrendQuery};
pub use article::{
    ArticleResponse, CreateArticleRequest, PublishAcceptedResponse, PublishArticleRequest,
    PublishStatusResponse, UpdateArticleRequest,
};
pub use auth::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, TokenResponse};
pub use blog::{
    BlogListQuery, BlogPostResponse, BlogPostSummary, BlogStatsResponse, CategoryCount,
    CategoryResponse, CounterResponse, CreateBlogPostRequest, RelatedQuery, SitemapEntry,
    UpdateBlogPostRequest,
};
pub use credit::{
    BalanceResponse, ConsumeCreditsRequest, CreditProductResponse, CreditRecordQuery,
    CreditRecordResponse, GrantCreditsRequest, ServicePriceResponse,
};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use invitation::{
    BindInvitationRequest, CommissionRecordResponse, CommissionStatusRequest,
    CommissionSummaryResponse, InvitationCodeResponse, InvitationInfoResponse,
    InvitationRelationResponse, InviteeResponse,
};
pub use pagination::{PagedResponse, PaginationMeta, PaginationParams};
pub use template::{
    CreateTemplateRequest, TemplateQuery, TemplateResponse, TemplateStatusRequest,
    UpdateTemplateRequest, UseCountResponse,
};
pub use trade::{CreateTradeRequest, MarkPaidRequest, TradeQuery, TradeResponse};
pub use user::{
    AdminUpdateUserRequest, AdminUserQuery, ChangePasswordRequest, UpdateProfileRequest,
    UserResponse, UserSummary,
};
