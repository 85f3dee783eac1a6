use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wrantle_domain::contact::ContactFields;
use wrantle_domain::id::ContactId;
use wrantle_domain::user::Privileges;
use wrantle_domain::verification::{CodeState, VerificationType};
use wrantle_domain::writing::{WritingStatus, is_visible};

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email_address: String,
    pub password_digest: String,
    pub is_staff: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn privileges(&self) -> Privileges {
        Privileges {
            is_staff: self.is_staff,
            is_admin: self.is_admin,
        }
    }
}

/// Staff/admin verification code.
#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub verification_type: VerificationType,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        CodeState::at(self.used_at, self.expires_at, now) == CodeState::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub fields: ContactFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Writing {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: WritingStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub excerpt: Option<String>,
    pub content: String,
    pub featured_image: Option<String>,
    pub downloadable_files: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Writing {
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        is_visible(self.status, self.published_at, now)
    }
}

/// Outbox event written alongside the record that caused it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// Outbox event as seen by the relay, with its delivery bookkeeping.
#[derive(Debug, Clone)]
pub struct PendingOutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub attempts: i32,
}

/// A plain-text mail ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Outcome of counting one request against a rate limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited,
}

/// Outbox event kinds.
pub const VERIFICATION_CODE_CREATED: &str = "verification_code_created";
pub const CONTACT_CONFIRMATION: &str = "contact_confirmation";
pub const CONTACT_NOTIFICATION: &str = "contact_notification";

/// Random contact id draws before giving up.
pub const CONTACT_ID_MAX_ATTEMPTS: u32 = 5;

/// Events fetched per relay poll.
pub const OUTBOX_BATCH_SIZE: u64 = 20;

/// Delivery attempts before an event is marked failed.
pub const OUTBOX_MAX_ATTEMPTS: i32 = 5;

/// First retry delay; doubles on every further failure.
pub const OUTBOX_BASE_BACKOFF_SECS: i64 = 30;

/// Upper bound on the retry delay.
pub const OUTBOX_MAX_BACKOFF_SECS: i64 = 3600;
