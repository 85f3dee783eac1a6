use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use wrantle_auth_types::identity::IdentityHeaders;
use wrantle_domain::verification::VerificationType;

use crate::error::SiteError;
use crate::handlers::AppJson;
use crate::state::AppState;
use crate::usecase::verification::{
    RequestVerificationInput, RequestVerificationUseCase, VerifyCodeInput, VerifyCodeUseCase,
};

// ── POST /verifications/{type}/request ───────────────────────────────────────

/// The code itself only travels by mail.
#[derive(Serialize)]
pub struct VerificationRequestedResponse {
    pub verification_type: VerificationType,
    #[serde(serialize_with = "wrantle_core::serde::to_rfc3339_ms")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

pub async fn request_verification(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(verification_type): Path<VerificationType>,
) -> Result<(StatusCode, Json<VerificationRequestedResponse>), SiteError> {
    let usecase = RequestVerificationUseCase {
        users: state.user_repo(),
        codes: state.verification_code_repo(),
        org_domain: state.config.org_email_domain.clone(),
    };
    let code = usecase
        .execute(RequestVerificationInput {
            user_id: identity.user_id,
            verification_type,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(VerificationRequestedResponse {
            verification_type: code.verification_type,
            expires_at: code.expires_at,
        }),
    ))
}

// ── POST /verifications/{type}/verify ────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub code: String,
}

pub async fn verify_code(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(verification_type): Path<VerificationType>,
    AppJson(body): AppJson<VerifyRequest>,
) -> Result<StatusCode, SiteError> {
    let usecase = VerifyCodeUseCase {
        codes: state.verification_code_repo(),
    };
    usecase
        .execute(VerifyCodeInput {
            user_id: identity.user_id,
            verification_type,
            code: body.code,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
