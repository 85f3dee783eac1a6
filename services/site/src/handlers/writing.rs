use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use wrantle_auth_types::identity::IdentityHeaders;
use wrantle_domain::pagination::PageRequest;
use wrantle_domain::writing::WritingStatus;

use crate::domain::types::Writing;
use crate::error::SiteError;
use crate::handlers::AppJson;
use crate::state::AppState;
use crate::usecase::writing::{
    CreateWritingUseCase, DeleteWritingUseCase, ListDraftWritingsUseCase,
    ListPublishedWritingsUseCase, ShowWritingUseCase, UpdateWritingUseCase, WritingInput,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct WritingResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub status: WritingStatus,
    #[serde(serialize_with = "wrantle_core::serde::option_to_rfc3339_ms")]
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub excerpt: Option<String>,
    pub content: String,
    pub featured_image: Option<String>,
    pub downloadable_files: Vec<String>,
    #[serde(serialize_with = "wrantle_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "wrantle_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Writing> for WritingResponse {
    fn from(w: Writing) -> Self {
        Self {
            id: w.id.to_string(),
            author_id: w.user_id.to_string(),
            title: w.title,
            slug: w.slug,
            status: w.status,
            published_at: w.published_at,
            excerpt: w.excerpt,
            content: w.content,
            featured_image: w.featured_image,
            downloadable_files: w.downloadable_files,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct WritingRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "wrantle_core::serde::double_option")]
    pub published_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "wrantle_core::serde::double_option")]
    pub excerpt: Option<Option<String>>,
    #[serde(default, deserialize_with = "wrantle_core::serde::double_option")]
    pub featured_image: Option<Option<String>>,
    pub downloadable_files: Option<Vec<String>>,
}

impl From<WritingRequest> for WritingInput {
    fn from(body: WritingRequest) -> Self {
        Self {
            title: body.title,
            content: body.content,
            status: body.status,
            published_at: body.published_at,
            excerpt: body.excerpt,
            featured_image: body.featured_image,
            downloadable_files: body.downloadable_files,
        }
    }
}

// ── GET /writings ────────────────────────────────────────────────────────────

pub async fn list_writings(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<WritingResponse>>, SiteError> {
    let usecase = ListPublishedWritingsUseCase {
        writings: state.writing_repo(),
    };
    let writings = usecase.execute(page).await?;
    Ok(Json(writings.into_iter().map(Into::into).collect()))
}

// ── GET /writings/drafts ─────────────────────────────────────────────────────

pub async fn list_drafts(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<WritingResponse>>, SiteError> {
    let usecase = ListDraftWritingsUseCase {
        users: state.user_repo(),
        writings: state.writing_repo(),
    };
    let writings = usecase.execute(identity.user_id, page).await?;
    Ok(Json(writings.into_iter().map(Into::into).collect()))
}

// ── GET /writings/{slug} ─────────────────────────────────────────────────────

pub async fn get_writing(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<WritingResponse>, SiteError> {
    let usecase = ShowWritingUseCase {
        users: state.user_repo(),
        writings: state.writing_repo(),
    };
    let writing = usecase
        .execute(identity.map(|i| i.user_id), &slug)
        .await?;
    Ok(Json(writing.into()))
}

// ── POST /writings ───────────────────────────────────────────────────────────

pub async fn create_writing(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    AppJson(body): AppJson<WritingRequest>,
) -> Result<(StatusCode, Json<WritingResponse>), SiteError> {
    let usecase = CreateWritingUseCase {
        users: state.user_repo(),
        writings: state.writing_repo(),
    };
    let writing = usecase.execute(identity.user_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(writing.into())))
}

// ── PATCH /writings/{slug} ───────────────────────────────────────────────────

pub async fn update_writing(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    AppJson(body): AppJson<WritingRequest>,
) -> Result<Json<WritingResponse>, SiteError> {
    let usecase = UpdateWritingUseCase {
        users: state.user_repo(),
        writings: state.writing_repo(),
    };
    let writing = usecase
        .execute(identity.user_id, &slug, body.into())
        .await?;
    Ok(Json(writing.into()))
}

// ── DELETE /writings/{slug} ──────────────────────────────────────────────────

pub async fn delete_writing(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, SiteError> {
    let usecase = DeleteWritingUseCase {
        users: state.user_repo(),
        writings: state.writing_repo(),
    };
    usecase.execute(identity.user_id, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
