use chrono::Utc;
use rand::RngExt;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use wrantle_domain::user::belongs_to_domain;
use wrantle_domain::verification::{
    CODE_CHARSET, CODE_LEN, VerificationType, expiry_for, is_well_formed_code,
};

use crate::domain::repository::{UserRepository, VerificationCodeRepository};
use crate::domain::types::{OutboxEvent, VERIFICATION_CODE_CREATED, VerificationCode};
use crate::error::SiteError;

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

pub struct RequestVerificationInput {
    pub user_id: Uuid,
    pub verification_type: VerificationType,
}

pub struct RequestVerificationUseCase<U, V>
where
    U: UserRepository,
    V: VerificationCodeRepository,
{
    pub users: U,
    pub codes: V,
    /// Organization mail domain, e.g. `wrantle.com`.
    pub org_domain: String,
}

impl<U, V> RequestVerificationUseCase<U, V>
where
    U: UserRepository,
    V: VerificationCodeRepository,
{
    pub async fn execute(
        &self,
        input: RequestVerificationInput,
    ) -> Result<VerificationCode, SiteError> {
        let user = self
            .users
            .find_by_id(input.user_id)
            .await?
            .ok_or(SiteError::UserNotFound)?;

        if !belongs_to_domain(&user.email_address, &self.org_domain) {
            return Err(SiteError::IneligibleDomain(self.org_domain.clone()));
        }

        // Earlier outstanding codes stay valid until they expire.
        let now = Utc::now();
        let code = VerificationCode {
            id: Uuid::now_v7(),
            user_id: user.id,
            verification_type: input.verification_type,
            code: generate_code(),
            expires_at: expiry_for(now),
            used_at: None,
            created_at: now,
        };

        let event = OutboxEvent {
            id: Uuid::new_v4(),
            kind: VERIFICATION_CODE_CREATED.to_owned(),
            payload: json!({
                "email": user.email_address,
                "code": code.code,
                "verification_type": code.verification_type,
            }),
            idempotency_key: format!("{VERIFICATION_CODE_CREATED}:{}", code.id),
        };

        self.codes.create_with_outbox(&code, &event).await?;
        info!(
            user_id = %user.id,
            verification_type = %code.verification_type,
            expires_at = %code.expires_at,
            "verification code issued"
        );
        Ok(code)
    }
}

pub struct VerifyCodeInput {
    pub user_id: Uuid,
    pub verification_type: VerificationType,
    pub code: String,
}

pub struct VerifyCodeUseCase<V: VerificationCodeRepository> {
    pub codes: V,
}

impl<V: VerificationCodeRepository> VerifyCodeUseCase<V> {
    /// Wrong, mistyped, used and expired codes all fail the same way.
    pub async fn execute(&self, input: VerifyCodeInput) -> Result<(), SiteError> {
        let submitted = input.code.trim();
        if !is_well_formed_code(submitted) {
            return Err(SiteError::InvalidVerificationCode);
        }

        let now = Utc::now();
        let code = self
            .codes
            .find_active(input.user_id, input.verification_type, submitted, now)
            .await?
            .ok_or(SiteError::InvalidVerificationCode)?;

        // Guarded by `used_at IS NULL`: a concurrent submission loses here.
        let consumed = self
            .codes
            .consume_and_promote(code.id, input.user_id, input.verification_type, now)
            .await?;
        if !consumed {
            return Err(SiteError::InvalidVerificationCode);
        }

        info!(
            user_id = %input.user_id,
            verification_type = %input.verification_type,
            "verification code consumed, privilege granted"
        );
        Ok(())
    }
}
