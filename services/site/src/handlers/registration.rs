use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::SiteError;
use crate::handlers::AppJson;
use crate::state::AppState;
use crate::usecase::registration::{RegisterInput, RegisterUseCase};

// ── POST /registrations ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub password: String,
    pub password_confirmation: Option<String>,
}

#[derive(Serialize)]
pub struct RegistrationResponse {
    pub id: String,
    pub email_address: String,
    #[serde(serialize_with = "wrantle_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), SiteError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        hasher: state.password_hasher(),
    };
    let user = usecase
        .execute(RegisterInput {
            email_address: body.email_address,
            password: body.password,
            password_confirmation: body.password_confirmation,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            id: user.id.to_string(),
            email_address: user.email_address,
            created_at: user.created_at,
        }),
    ))
}
