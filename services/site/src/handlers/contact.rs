use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use wrantle_auth_types::identity::IdentityHeaders;
use wrantle_domain::contact::{ContactForm, ContactStatus, ContactType};
use wrantle_domain::id::ContactId;
use wrantle_domain::pagination::PageRequest;

use crate::domain::types::Contact;
use crate::error::SiteError;
use crate::handlers::AppJson;
use crate::state::AppState;
use crate::usecase::contact::{
    ContactPatch, CreateContactUseCase, DeleteContactUseCase, ListContactsUseCase,
    RandomContactIds, ShowContactUseCase, UpdateContactUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ContactResponse {
    pub id: ContactId,
    pub contact_type: ContactType,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub status: ContactStatus,
    #[serde(serialize_with = "wrantle_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "wrantle_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        let f = contact.fields;
        Self {
            id: contact.id,
            contact_type: f.contact_type,
            name: f.name,
            email: f.email,
            phone: f.phone,
            message: f.message,
            preferred_date: f.preferred_date,
            preferred_time: f.preferred_time,
            status: f.status,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        }
    }
}

/// Ids outside the nine-digit range cannot exist, so they are simply not found.
fn parse_contact_id(raw: &str) -> Result<ContactId, SiteError> {
    raw.parse().map_err(|_| SiteError::ContactNotFound)
}

// ── POST /contacts ───────────────────────────────────────────────────────────

pub async fn create_contact(
    State(state): State<AppState>,
    AppJson(form): AppJson<ContactForm>,
) -> Result<(StatusCode, Json<ContactResponse>), SiteError> {
    let usecase = CreateContactUseCase {
        contacts: state.contact_repo(),
        ids: RandomContactIds,
    };
    let contact = usecase.execute(form).await?;
    Ok((StatusCode::CREATED, Json(contact.into())))
}

// ── GET /contacts/{id} ───────────────────────────────────────────────────────

pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactResponse>, SiteError> {
    let id = parse_contact_id(&id)?;
    let usecase = ShowContactUseCase {
        contacts: state.contact_repo(),
    };
    let contact = usecase.execute(id).await?;
    Ok(Json(contact.into()))
}

// ── GET /contacts ────────────────────────────────────────────────────────────

pub async fn list_contacts(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<ContactResponse>>, SiteError> {
    let usecase = ListContactsUseCase {
        users: state.user_repo(),
        contacts: state.contact_repo(),
    };
    let contacts = usecase.execute(identity.user_id, page).await?;
    Ok(Json(contacts.into_iter().map(Into::into).collect()))
}

// ── PATCH /contacts/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub contact_type: Option<String>,
    pub message: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub status: Option<String>,
}

impl From<UpdateContactRequest> for ContactPatch {
    fn from(body: UpdateContactRequest) -> Self {
        Self {
            name: body.name,
            email: body.email,
            phone: body.phone,
            contact_type: body.contact_type,
            message: body.message,
            preferred_date: body.preferred_date,
            preferred_time: body.preferred_time,
            status: body.status,
        }
    }
}

pub async fn update_contact(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<UpdateContactRequest>,
) -> Result<Json<ContactResponse>, SiteError> {
    let id = parse_contact_id(&id)?;
    let usecase = UpdateContactUseCase {
        users: state.user_repo(),
        contacts: state.contact_repo(),
    };
    let contact = usecase.execute(identity.user_id, id, body.into()).await?;
    Ok(Json(contact.into()))
}

// ── DELETE /contacts/{id} ────────────────────────────────────────────────────

pub async fn delete_contact(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, SiteError> {
    let id = parse_contact_id(&id)?;
    let usecase = DeleteContactUseCase {
        users: state.user_repo(),
        contacts: state.contact_repo(),
    };
    usecase.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
