use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{InvitationCode, InvitationRelation, User};
use crate::repositories::{InvitationRepository, UserRepository};
use crate::utils::ids;

#[derive(Debug, Clone)]
pub struct InvitationInfo {
    pub code: InvitationCode,
    pub invitation_count: i64,
    pub inviter: Option<User>,
}

#[derive(Clone)]
pub struct InvitationService {
    repo: InvitationRepository,
    users: UserRepository,
    reward_credits: i32,
    code_max_attempts: u32,
}

impl InvitationService {
    pub fn new(
        repo: InvitationRepository,
        users: UserRepository,
        reward_credits: i32,
        code_max_attempts: u32,
    ) -> Self {
        Self {
            repo,
            users,
            reward_credits,
            code_max_attempts: code_max_attempts.max(1),
        }
    }

    /// Returns the caller's code, generating one on first use. A collision on
    /// the generated value is retried with a fresh one.
    pub async fn get_or_create_code(&self, user_id: &str) -> AppResult<InvitationCode> {
        if let Some(code) = self.repo.find_code_by_user(user_id).await? {
            return Ok(code);
        }

        for attempt in 1..=self.code_max_attempts {
            let candidate = ids::invitation_code();
            match self.repo.insert_code(user_id, &candidate).await {
                Ok(code) => {
                    info!(user_id, code = %code.code, "Invitation code created");
                    return Ok(code);
                }
                Err(AppError::Duplicate { field, .. }) if field != "user_id" => {
                    warn!(attempt, "Invitation code collision, retrying");
                }
                Err(AppError::Duplicate { .. }) => {
                    // created concurrently by another request
                    if let Some(code) = self.repo.find_code_by_user(user_id).await? {
                        return Ok(code);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Internal {
            source: anyhow::anyhow!(
                "could not generate a unique invitation code after {} attempts",
                self.code_max_attempts
            ),
        })
    }

    /// Binds the caller to the inviter owning `code` and pays both the reward.
    pub async fn bind(&self, invitee_id: &str, code: &str) -> AppResult<InvitationRelation> {
        let normalized = code.trim().to_uppercase();
        let code = self
            .repo
            .find_code(&normalized)
            .await?
            .ok_or_else(|| AppError::not_found("invitation_codes", "code", &normalized))?;

        if code.user_id == invitee_id {
            return Err(AppError::bad_request("You cannot use your own invitation code"));
        }
        if self.repo.find_relation_by_invitee(invitee_id).await?.is_some() {
            return Err(AppError::Duplicate {
                entity: "invitation_relations".to_string(),
                field: "invitee_id".to_string(),
                value: invitee_id.to_string(),
            });
        }

        let relation = self.repo.bind(&code, invitee_id, self.reward_credits).await?;
        info!(inviter_id = %relation.inviter_id, invitee_id, "Invitation relation created");
        Ok(relation)
    }

    pub async fn info(&self, user_id: &str) -> AppResult<InvitationInfo> {
        let code = self.get_or_create_code(user_id).await?;
        let invitation_count = self.repo.count_invitees(user_id).await?;
        let inviter = match self.repo.find_relation_by_invitee(user_id).await? {
            Some(relation) => self.users.find_by_id(&relation.inviter_id).await?,
            None => None,
        };
        Ok(InvitationInfo {
            code,
            invitation_count,
            inviter,
        })
    }

    pub async fn invitees(
        &self,
        inviter_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<(InvitationRelation, User)>, i64)> {
        self.repo.list_invitees(inviter_id, offset, limit).await
    }
}
