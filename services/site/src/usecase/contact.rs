use anyhow::Context as _;
use chrono::Utc;
use rand::RngExt;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use wrantle_domain::contact::ContactForm;
use wrantle_domain::id::{CONTACT_ID_RANGE, ContactId};
use wrantle_domain::pagination::PageRequest;

use crate::domain::repository::{ContactInsert, ContactRepository, UserRepository};
use crate::domain::types::{
    CONTACT_CONFIRMATION, CONTACT_ID_MAX_ATTEMPTS, CONTACT_NOTIFICATION, Contact, OutboxEvent,
};
use crate::error::SiteError;
use crate::usecase::user::require_editor;

/// Source of candidate contact ids.
pub trait ContactIdSource: Send + Sync {
    fn next_id(&self) -> Result<ContactId, SiteError>;
}

/// Uniform draw from the nine-digit range.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomContactIds;

impl ContactIdSource for RandomContactIds {
    fn next_id(&self) -> Result<ContactId, SiteError> {
        let value = rand::rng().random_range(CONTACT_ID_RANGE);
        Ok(ContactId::new(value).context("draw contact id")?)
    }
}

fn contact_events(contact: &Contact) -> Vec<OutboxEvent> {
    let f = &contact.fields;
    let payload = json!({
        "contact_id": contact.id,
        "contact_type": f.contact_type,
        "name": f.name,
        "email": f.email,
        "phone": f.phone,
        "message": f.message,
        "preferred_date": f.preferred_date,
        "preferred_time": f.preferred_time,
    });
    [CONTACT_CONFIRMATION, CONTACT_NOTIFICATION]
        .into_iter()
        .map(|kind| {
            // Contact ids can be reused after deletion, so the key carries the event id.
            let id = Uuid::new_v4();
            OutboxEvent {
                id,
                kind: kind.to_owned(),
                payload: payload.clone(),
                idempotency_key: format!("{kind}:{}:{id}", contact.id),
            }
        })
        .collect()
}

pub struct CreateContactUseCase<C, I>
where
    C: ContactRepository,
    I: ContactIdSource,
{
    pub contacts: C,
    pub ids: I,
}

impl<C, I> CreateContactUseCase<C, I>
where
    C: ContactRepository,
    I: ContactIdSource,
{
    pub async fn execute(&self, form: ContactForm) -> Result<Contact, SiteError> {
        let fields = form.validate()?;
        let now = Utc::now();

        for attempt in 1..=CONTACT_ID_MAX_ATTEMPTS {
            let id = self.ids.next_id()?;
            if self.contacts.exists(id).await? {
                debug!(contact_id = %id, attempt, "contact id collision");
                continue;
            }

            let contact = Contact {
                id,
                fields: fields.clone(),
                created_at: now,
                updated_at: now,
            };
            let events = contact_events(&contact);
            match self.contacts.create_with_outbox(&contact, &events).await? {
                ContactInsert::Inserted => {
                    info!(
                        contact_id = %contact.id,
                        contact_type = %contact.fields.contact_type,
                        "contact request created"
                    );
                    return Ok(contact);
                }
                ContactInsert::IdTaken => {
                    debug!(contact_id = %id, attempt, "contact id taken at insert");
                }
            }
        }

        warn!(
            attempts = CONTACT_ID_MAX_ATTEMPTS,
            "no free contact id found"
        );
        Err(SiteError::ContactIdExhausted)
    }
}

pub struct ShowContactUseCase<C: ContactRepository> {
    pub contacts: C,
}

impl<C: ContactRepository> ShowContactUseCase<C> {
    pub async fn execute(&self, id: ContactId) -> Result<Contact, SiteError> {
        self.contacts
            .find_by_id(id)
            .await?
            .ok_or(SiteError::ContactNotFound)
    }
}

pub struct ListContactsUseCase<U, C>
where
    U: UserRepository,
    C: ContactRepository,
{
    pub users: U,
    pub contacts: C,
}

impl<U, C> ListContactsUseCase<U, C>
where
    U: UserRepository,
    C: ContactRepository,
{
    pub async fn execute(&self, actor: Uuid, page: PageRequest) -> Result<Vec<Contact>, SiteError> {
        require_editor(&self.users, actor).await?;
        self.contacts.list(page.clamped()).await
    }
}

/// Partial contact update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub contact_type: Option<String>,
    pub message: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub status: Option<String>,
}

impl ContactPatch {
    fn apply(self, form: &mut ContactForm) {
        if let Some(v) = self.name {
            form.name = v;
        }
        if let Some(v) = self.email {
            form.email = v;
        }
        if let Some(v) = self.phone {
            form.phone = v;
        }
        if let Some(v) = self.message {
            form.message = v;
        }
        if self.contact_type.is_some() {
            form.contact_type = self.contact_type;
        }
        if self.preferred_date.is_some() {
            form.preferred_date = self.preferred_date;
        }
        if self.preferred_time.is_some() {
            form.preferred_time = self.preferred_time;
        }
        if self.status.is_some() {
            form.status = self.status;
        }
    }
}

pub struct UpdateContactUseCase<U, C>
where
    U: UserRepository,
    C: ContactRepository,
{
    pub users: U,
    pub contacts: C,
}

impl<U, C> UpdateContactUseCase<U, C>
where
    U: UserRepository,
    C: ContactRepository,
{
    pub async fn execute(
        &self,
        actor: Uuid,
        id: ContactId,
        patch: ContactPatch,
    ) -> Result<Contact, SiteError> {
        require_editor(&self.users, actor).await?;
        let mut contact = self
            .contacts
            .find_by_id(id)
            .await?
            .ok_or(SiteError::ContactNotFound)?;

        let mut form = contact.fields.to_form();
        patch.apply(&mut form);
        contact.fields = form.validate()?;
        contact.updated_at = Utc::now();

        self.contacts.update(&contact).await?;
        info!(
            contact_id = %contact.id,
            status = %contact.fields.status,
            "contact request updated"
        );
        Ok(contact)
    }
}

pub struct DeleteContactUseCase<U, C>
where
    U: UserRepository,
    C: ContactRepository,
{
    pub users: U,
    pub contacts: C,
}

impl<U, C> DeleteContactUseCase<U, C>
where
    U: UserRepository,
    C: ContactRepository,
{
    pub async fn execute(&self, actor: Uuid, id: ContactId) -> Result<(), SiteError> {
        require_editor(&self.users, actor).await?;
        if !self.contacts.delete(id).await? {
            return Err(SiteError::ContactNotFound);
        }
        info!(contact_id = %id, "contact request deleted");
        Ok(())
    }
}
