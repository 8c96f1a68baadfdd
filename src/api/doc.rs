use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const AUTH_TAG: &str = "Auth";
pub const USER_TAG: &str = "User";
pub const HEALTH_TAG: &str = "Health";
pub const CREDIT_TAG: &str = "Credits";
pub const TRADE_TAG: &str = "Trades";
pub const AI_TASK_TAG: &str = "AI Tasks";
pub const TEMPLATE_TAG: &str = "Templates";
pub const BLOG_TAG: &str = "Blog";
pub const ARTICLE_TAG: &str = "Articles";
pub const INVITATION_TAG: &str = "Invitations";
pub const ADMIN_TAG: &str = "Admin";
pub const ANALYTICS_TAG: &str = "Analytics";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inkdesk",
        description = "API server for the inkdesk writing platform",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::api::dto::PaginationMeta,
        )
    ),
    tags(
        (name = AUTH_TAG, description = "Registration, login and token refresh"),
        (name = USER_TAG, description = "Current user profile"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = CREDIT_TAG, description = "Credit balance, ledger and pricing"),
        (name = TRADE_TAG, description = "Recharge orders"),
        (name = AI_TASK_TAG, description = "AI generation task records"),
        (name = TEMPLATE_TAG, description = "Layout template gallery"),
        (name = BLOG_TAG, description = "Public blog"),
        (name = ARTICLE_TAG, description = "Article editing and publishing"),
        (name = INVITATION_TAG, description = "Invitation codes and commissions"),
        (name = ADMIN_TAG, description = "Administration endpoints"),
        (name = ANALYTICS_TAG, description = "Admin analytics reports"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token"))
                        .build(),
                ),
            )
        }
    }
}
