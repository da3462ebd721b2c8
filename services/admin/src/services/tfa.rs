//! Email verification codes

use chrono::{Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    hashing::{hash_secret, verify_secret},
    middleware::AuthUser,
    models::{TfaIssued, TfaSession, TfaStatus, VerifyCodeRequest},
    notify::Mailer,
    rate_limiter::RateLimiter,
    repositories::{TemplateRepository, TfaRepository, UserRepository},
};

/// Template used to mail codes
pub const CODE_TEMPLATE: &str = "tfa_code";

/// Uniformly random 6-digit code, zero padded
pub fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

#[derive(Clone)]
pub struct TfaService {
    sessions: TfaRepository,
    users: UserRepository,
    templates: TemplateRepository,
    mailer: Mailer,
    limiter: RateLimiter,
    code_ttl: Duration,
}

impl TfaService {
    pub fn new(
        sessions: TfaRepository,
        users: UserRepository,
        templates: TemplateRepository,
        mailer: Mailer,
        limiter: RateLimiter,
        code_ttl_minutes: i64,
    ) -> Self {
        Self {
            sessions,
            users,
            templates,
            mailer,
            limiter,
            code_ttl: Duration::minutes(code_ttl_minutes),
        }
    }

    /// Open a PENDING session and mail its code
    pub async fn send_code(&self, user_id: Uuid) -> ApiResult<TfaIssued> {
        if !self.limiter.is_allowed(&format!("send:{}", user_id)).await {
            return Err(ApiError::TooManyRequests);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let code = generate_code();
        let expires_at = Utc::now() + self.code_ttl;
        let session = self
            .sessions
            .create(user_id, &hash_secret(&code)?, expires_at)
            .await?;

        info!("Issued verification session {} for user {}", session.id, user_id);

        let delivered = match self.templates.find_by_name(CODE_TEMPLATE).await? {
            Some(template) => {
                let vars = HashMap::from([
                    ("name", user.name.clone()),
                    ("code", code),
                    ("minutes", self.code_ttl.num_minutes().to_string()),
                ]);
                let mail = template.render(&vars);
                self.mailer.deliver(&user.email, &mail.subject, &mail.body).await
            }
            None => {
                warn!("Template {} is missing, code not mailed", CODE_TEMPLATE);
                false
            }
        };

        Ok(TfaIssued {
            session_id: session.id,
            expires_at: session.expires_at,
            delivered,
        })
    }

    /// Check a code and mark its session VALIDATED
    ///
    /// Only the session owner or active staff may verify; anyone else is
    /// refused before the owner's attempt budget is touched.
    pub async fn verify_code(
        &self,
        caller: &AuthUser,
        request: &VerifyCodeRequest,
    ) -> ApiResult<TfaSession> {
        let session = self
            .sessions
            .find_by_id(request.session_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Verification session not found".to_string()))?;

        if !caller.can_act_for(session.user_id) {
            warn!(
                "User {} tried to verify session {} of user {}",
                caller.id, session.id, session.user_id
            );
            return Err(ApiError::Forbidden);
        }

        let limiter_key = format!("verify:{}", session.user_id);
        if !self.limiter.is_allowed(&limiter_key).await {
            return Err(ApiError::TooManyRequests);
        }

        if session.status == TfaStatus::Validated {
            return Err(ApiError::Conflict("Code has already been used".to_string()));
        }
        if session.is_expired(Utc::now()) {
            return Err(ApiError::Validation("Code has expired".to_string()));
        }
        if !verify_secret(request.code.trim(), &session.code_hash)? {
            return Err(ApiError::Validation("Invalid code".to_string()));
        }

        // A concurrent verify or the expiry may have won since the read
        let validated = self
            .sessions
            .mark_validated(session.id)
            .await?
            .ok_or_else(|| ApiError::Conflict("Code is no longer valid".to_string()))?;

        self.limiter.reset(&limiter_key).await;
        info!("Verification session {} validated", validated.id);
        Ok(validated)
    }
}
