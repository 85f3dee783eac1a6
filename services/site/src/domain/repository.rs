#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use wrantle_domain::id::ContactId;
use wrantle_domain::pagination::PageRequest;
use wrantle_domain::verification::VerificationType;

use crate::domain::types::{
    Contact, OutboxEvent, OutgoingMail, PendingOutboxEvent, RateDecision, User, VerificationCode,
    Writing,
};
use crate::error::SiteError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, SiteError>;

    /// Look up by normalized email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, SiteError>;

    /// Insert a new user. A duplicate email surfaces as `EmailTaken`.
    async fn create(&self, user: &User) -> Result<(), SiteError>;
}

/// Repository for staff/admin verification codes.
pub trait VerificationCodeRepository: Send + Sync {
    /// Insert a code and its mail event atomically (same transaction).
    /// A duplicate code value surfaces as `CodeConflict`.
    async fn create_with_outbox(
        &self,
        code: &VerificationCode,
        event: &OutboxEvent,
    ) -> Result<(), SiteError>;

    /// Find an active (unused, unexpired at `now`) code by owner, type and value.
    async fn find_active(
        &self,
        user_id: Uuid,
        verification_type: VerificationType,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, SiteError>;

    /// In one transaction, set `used_at = now` on a still-unused code and raise
    /// the matching privilege flag on its owner.
    ///
    /// Returns `false` without promoting anyone if the code was already used.
    async fn consume_and_promote(
        &self,
        code_id: Uuid,
        user_id: Uuid,
        verification_type: VerificationType,
        now: DateTime<Utc>,
    ) -> Result<bool, SiteError>;
}

/// Result of inserting a contact under a freshly drawn id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactInsert {
    Inserted,
    /// The id was taken between the existence check and the insert.
    IdTaken,
}

/// Repository for contact requests.
pub trait ContactRepository: Send + Sync {
    async fn exists(&self, id: ContactId) -> Result<bool, SiteError>;

    /// Insert a contact and its mail events atomically (same transaction).
    async fn create_with_outbox(
        &self,
        contact: &Contact,
        events: &[OutboxEvent],
    ) -> Result<ContactInsert, SiteError>;

    async fn find_by_id(&self, id: ContactId) -> Result<Option<Contact>, SiteError>;

    /// Newest first.
    async fn list(&self, page: PageRequest) -> Result<Vec<Contact>, SiteError>;

    async fn update(&self, contact: &Contact) -> Result<(), SiteError>;

    /// Returns `true` if deleted, `false` if not found.
    async fn delete(&self, id: ContactId) -> Result<bool, SiteError>;
}

/// Repository for writings.
pub trait WritingRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Writing>, SiteError>;

    /// Visible at `now`, most recently published first.
    async fn list_published(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<Writing>, SiteError>;

    /// Drafts, most recently updated first.
    async fn list_drafts(&self, page: PageRequest) -> Result<Vec<Writing>, SiteError>;

    /// A duplicate slug surfaces as `SlugTaken`.
    async fn create(&self, writing: &Writing) -> Result<(), SiteError>;

    /// A duplicate slug surfaces as `SlugTaken`.
    async fn update(&self, writing: &Writing) -> Result<(), SiteError>;

    /// Returns `true` if deleted, `false` if not found.
    async fn delete(&self, id: Uuid) -> Result<bool, SiteError>;
}

/// Relay-side access to the outbox table.
pub trait OutboxRepository: Send + Sync {
    /// Unprocessed, unfailed events due at `now`, oldest first.
    async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<PendingOutboxEvent>, SiteError>;

    async fn mark_processed(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), SiteError>;

    async fn schedule_retry(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), SiteError>;

    async fn mark_failed(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SiteError>;
}

/// Port for one-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// PHC-format digest of `password`.
    async fn hash(&self, password: &str) -> Result<String, SiteError>;
}

/// Port for mail delivery.
pub trait MailSender: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()>;
}

/// Port for fixed-window request counting.
pub trait RateLimiter: Send + Sync {
    /// Count one request under `key`, allowing at most `limit` per `window_secs`.
    async fn hit(&self, key: &str, limit: u64, window_secs: u64)
    -> Result<RateDecision, SiteError>;
}
