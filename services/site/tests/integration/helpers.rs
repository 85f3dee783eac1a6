use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use wrantle_domain::contact::{ContactFields, ContactStatus, ContactType};
use wrantle_domain::id::ContactId;
use wrantle_domain::pagination::PageRequest;
use wrantle_domain::verification::VerificationType;
use wrantle_domain::writing::WritingStatus;
use wrantle_site::domain::repository::{
    ContactInsert, ContactRepository, PasswordHasher, UserRepository,
    VerificationCodeRepository, WritingRepository,
};
use wrantle_site::domain::types::{Contact, OutboxEvent, User, VerificationCode, Writing};
use wrantle_site::error::SiteError;
use wrantle_site::usecase::contact::ContactIdSource;

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns a shared handle to the internal user list for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, SiteError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, SiteError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email_address == email)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), SiteError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email_address == user.email_address) {
            return Err(SiteError::EmailTaken);
        }
        users.push(user.clone());
        Ok(())
    }
}

// ── MockVerificationCodeRepo ─────────────────────────────────────────────────

/// Shares the user list with a [`MockUserRepo`] so promotions are observable.
#[derive(Clone)]
pub struct MockVerificationCodeRepo {
    pub codes: Arc<Mutex<Vec<VerificationCode>>>,
    pub events: Arc<Mutex<Vec<OutboxEvent>>>,
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockVerificationCodeRepo {
    pub fn new(users: Arc<Mutex<Vec<User>>>) -> Self {
        Self {
            codes: Arc::new(Mutex::new(vec![])),
            events: Arc::new(Mutex::new(vec![])),
            users,
        }
    }
}

impl VerificationCodeRepository for MockVerificationCodeRepo {
    async fn create_with_outbox(
        &self,
        code: &VerificationCode,
        event: &OutboxEvent,
    ) -> Result<(), SiteError> {
        let mut codes = self.codes.lock().unwrap();
        if codes.iter().any(|c| c.code == code.code) {
            return Err(SiteError::CodeConflict);
        }
        codes.push(code.clone());
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        verification_type: VerificationType,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, SiteError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| {
                c.user_id == user_id
                    && c.verification_type == verification_type
                    && c.code == code
                    && c.is_active(now)
            })
            .cloned())
    }

    async fn consume_and_promote(
        &self,
        code_id: Uuid,
        user_id: Uuid,
        verification_type: VerificationType,
        now: DateTime<Utc>,
    ) -> Result<bool, SiteError> {
        let mut codes = self.codes.lock().unwrap();
        let Some(code) = codes
            .iter_mut()
            .find(|c| c.id == code_id && c.used_at.is_none())
        else {
            return Ok(false);
        };
        code.used_at = Some(now);

        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            match verification_type {
                VerificationType::Staff => user.is_staff = true,
                VerificationType::Admin => user.is_admin = true,
            }
            user.updated_at = now;
        }
        Ok(true)
    }
}

// ── MockContactRepo ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockContactRepo {
    pub contacts: Arc<Mutex<Vec<Contact>>>,
    pub events: Arc<Mutex<Vec<OutboxEvent>>>,
    /// Ids that pass the existence check but collide at insert, as if a
    /// concurrent request claimed them in between.
    pub racing_ids: HashSet<ContactId>,
}

impl MockContactRepo {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self {
            contacts: Arc::new(Mutex::new(contacts)),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contacts_handle(&self) -> Arc<Mutex<Vec<Contact>>> {
        Arc::clone(&self.contacts)
    }

    pub fn events_handle(&self) -> Arc<Mutex<Vec<OutboxEvent>>> {
        Arc::clone(&self.events)
    }
}

impl ContactRepository for MockContactRepo {
    async fn exists(&self, id: ContactId) -> Result<bool, SiteError> {
        Ok(self.contacts.lock().unwrap().iter().any(|c| c.id == id))
    }

    async fn create_with_outbox(
        &self,
        contact: &Contact,
        events: &[OutboxEvent],
    ) -> Result<ContactInsert, SiteError> {
        let mut contacts = self.contacts.lock().unwrap();
        if self.racing_ids.contains(&contact.id) || contacts.iter().any(|c| c.id == contact.id) {
            return Ok(ContactInsert::IdTaken);
        }
        contacts.push(contact.clone());
        self.events.lock().unwrap().extend_from_slice(events);
        Ok(ContactInsert::Inserted)
    }

    async fn find_by_id(&self, id: ContactId) -> Result<Option<Contact>, SiteError> {
        Ok(self
            .contacts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Contact>, SiteError> {
        let mut contacts = self.contacts.lock().unwrap().clone();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(&contacts, page))
    }

    async fn update(&self, contact: &Contact) -> Result<(), SiteError> {
        let mut contacts = self.contacts.lock().unwrap();
        if let Some(existing) = contacts.iter_mut().find(|c| c.id == contact.id) {
            *existing = contact.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: ContactId) -> Result<bool, SiteError> {
        let mut contacts = self.contacts.lock().unwrap();
        let before = contacts.len();
        contacts.retain(|c| c.id != id);
        Ok(contacts.len() < before)
    }
}

/// Hands out a fixed sequence of contact ids.
pub struct SequenceIds {
    ids: Mutex<VecDeque<u32>>,
}

impl SequenceIds {
    pub fn new(ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            ids: Mutex::new(ids.into_iter().collect()),
        }
    }
}

impl ContactIdSource for SequenceIds {
    fn next_id(&self) -> Result<ContactId, SiteError> {
        let value = self
            .ids
            .lock()
            .unwrap()
            .pop_front()
            .expect("id sequence exhausted");
        Ok(ContactId::new(value).unwrap())
    }
}

// ── MockWritingRepo ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockWritingRepo {
    pub writings: Arc<Mutex<Vec<Writing>>>,
}

impl MockWritingRepo {
    pub fn new(writings: Vec<Writing>) -> Self {
        Self {
            writings: Arc::new(Mutex::new(writings)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn writings_handle(&self) -> Arc<Mutex<Vec<Writing>>> {
        Arc::clone(&self.writings)
    }
}

impl WritingRepository for MockWritingRepo {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Writing>, SiteError> {
        Ok(self
            .writings
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.slug == slug)
            .cloned())
    }

    async fn list_published(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<Writing>, SiteError> {
        let mut visible: Vec<Writing> = self
            .writings
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.is_visible(now))
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(page_of(&visible, page))
    }

    async fn list_drafts(&self, page: PageRequest) -> Result<Vec<Writing>, SiteError> {
        let mut drafts: Vec<Writing> = self
            .writings
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.status == WritingStatus::Draft)
            .cloned()
            .collect();
        drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(page_of(&drafts, page))
    }

    async fn create(&self, writing: &Writing) -> Result<(), SiteError> {
        let mut writings = self.writings.lock().unwrap();
        if writings.iter().any(|w| w.slug == writing.slug) {
            return Err(SiteError::SlugTaken);
        }
        writings.push(writing.clone());
        Ok(())
    }

    async fn update(&self, writing: &Writing) -> Result<(), SiteError> {
        let mut writings = self.writings.lock().unwrap();
        if writings
            .iter()
            .any(|w| w.slug == writing.slug && w.id != writing.id)
        {
            return Err(SiteError::SlugTaken);
        }
        if let Some(existing) = writings.iter_mut().find(|w| w.id == writing.id) {
            *existing = writing.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, SiteError> {
        let mut writings = self.writings.lock().unwrap();
        let before = writings.len();
        writings.retain(|w| w.id != id);
        Ok(writings.len() < before)
    }
}

// ── MockHasher ───────────────────────────────────────────────────────────────

pub struct MockHasher;

impl PasswordHasher for MockHasher {
    async fn hash(&self, password: &str) -> Result<String, SiteError> {
        Ok(format!("hashed:{password}"))
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user(email: &str, is_staff: bool, is_admin: bool) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email_address: email.to_owned(),
        password_digest: "hashed:password".to_owned(),
        is_staff,
        is_admin,
        created_at: now,
        updated_at: now,
    }
}

/// Staff and admin: may manage contacts and writings.
pub fn editor() -> User {
    test_user("editor@wrantle.com", true, true)
}

pub fn staff_only() -> User {
    test_user("staff@wrantle.com", true, false)
}

pub fn test_code(user_id: Uuid, verification_type: VerificationType, code: &str) -> VerificationCode {
    let now = Utc::now();
    VerificationCode {
        id: Uuid::new_v4(),
        user_id,
        verification_type,
        code: code.to_owned(),
        expires_at: now + Duration::minutes(30),
        used_at: None,
        created_at: now,
    }
}

pub fn test_contact(id: u32, created_at: DateTime<Utc>) -> Contact {
    Contact {
        id: ContactId::new(id).unwrap(),
        fields: ContactFields {
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "+44 20 7946 0000".to_owned(),
            contact_type: ContactType::RequestInfo,
            message: "Tell me more.".to_owned(),
            preferred_date: None,
            preferred_time: None,
            status: ContactStatus::Pending,
        },
        created_at,
        updated_at: created_at,
    }
}

pub fn test_writing(
    author: Uuid,
    slug: &str,
    status: WritingStatus,
    published_at: Option<DateTime<Utc>>,
) -> Writing {
    let now = Utc::now();
    Writing {
        id: Uuid::new_v4(),
        user_id: author,
        title: slug.replace('-', " "),
        slug: slug.to_owned(),
        status,
        published_at,
        excerpt: None,
        content: "Body".to_owned(),
        featured_image: None,
        downloadable_files: vec![],
        created_at: now,
        updated_at: now,
    }
}
