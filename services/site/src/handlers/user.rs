use axum::{Json, extract::State};
use serde::Serialize;

use wrantle_auth_types::identity::IdentityHeaders;

use crate::domain::types::User;
use crate::error::SiteError;
use crate::state::AppState;
use crate::usecase::user::GetMeUseCase;

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email_address: String,
    pub is_staff: bool,
    pub is_admin: bool,
    #[serde(serialize_with = "wrantle_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "wrantle_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email_address: user.email_address,
            is_staff: user.is_staff,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── GET /users/@me ───────────────────────────────────────────────────────────

pub async fn get_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, SiteError> {
    let usecase = GetMeUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(Json(user.into()))
}
