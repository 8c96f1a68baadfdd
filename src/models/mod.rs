mod ai_task;
mod article;
mod blog;
mod codes;
mod credit;
mod invitation;
mod template;
mod trade;
mod user;

pub use ai_task::{AiTask, AiTaskStatus, AiTaskType, NewAiTask, UpdateAiTask};
pub use article::{ArticleEditTask, ArticleStatus, NewArticleEditTask, UpdateArticleEditTask};
pub use blog::{
    BLOG_CATEGORIES, BlogPost, BlogPostStatus, BlogTag, DEFAULT_AUTHOR, NewBlogPost,
    NewBlogPostTag, NewBlogSeoKeyword, NewBlogTag, UpdateBlogPost, is_valid_category,
};
pub use codes::{
    CommissionStatus, CreditRecordType, PriceType, ServiceUnit, TemplateStatus, TemplateType,
    UserRole, Visibility,
};
pub use credit::{CreditProduct, CreditRecord, CreditServicePrice, NewCreditRecord};
pub use invitation::{
    CommissionRecord, InvitationCode, InvitationRelation, NewCommissionRecord,
    NewInvitationCode, NewInvitationRelation, UpdateCommissionRecord,
};
pub use template::{NewTemplate, Template, UpdateTemplate};
pub use trade::{NewTrade, PaymentChannel, PaymentStatus, Trade, TradeType};
pub use user::{NewUser, UpdateUser, User};
