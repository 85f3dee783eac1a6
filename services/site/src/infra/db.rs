use anyhow::{Context as _, anyhow};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionError,
    TransactionTrait,
};
use uuid::Uuid;

use wrantle_domain::contact::ContactFields;
use wrantle_domain::id::ContactId;
use wrantle_domain::pagination::PageRequest;
use wrantle_domain::verification::VerificationType;
use wrantle_domain::writing::WritingStatus;
use wrantle_site_schema::{contacts, outbox_events, users, verification_codes, writings};

use crate::domain::repository::{
    ContactInsert, ContactRepository, OutboxRepository, UserRepository,
    VerificationCodeRepository, WritingRepository,
};
use crate::domain::types::{
    Contact, OutboxEvent, PendingOutboxEvent, User, VerificationCode, Writing,
};
use crate::error::SiteError;

// ── Shared helpers ───────────────────────────────────────────────────────────

/// Unique index or primary key violation.
///
/// Falls back to the Postgres message text for errors that reach us without a
/// driver error attached (e.g. `DbErr::Custom`).
fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err
            .to_string()
            .contains("duplicate key value violates unique constraint")
}

fn txn_err(err: TransactionError<DbErr>) -> DbErr {
    match err {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => e,
    }
}

fn internal(err: DbErr, context: &'static str) -> SiteError {
    SiteError::Internal(anyhow::Error::new(err).context(context))
}

async fn insert_outbox_event(
    txn: &DatabaseTransaction,
    event: &OutboxEvent,
) -> Result<(), DbErr> {
    let now = Utc::now();
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, SiteError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, SiteError> {
        let model = users::Entity::find()
            .filter(users::Column::EmailAddress.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), SiteError> {
        users::ActiveModel {
            id: Set(user.id),
            email_address: Set(user.email_address.clone()),
            password_digest: Set(user.password_digest.clone()),
            is_staff: Set(user.is_staff),
            is_admin: Set(user.is_admin),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                SiteError::EmailTaken
            } else {
                internal(e, "create user")
            }
        })?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email_address: model.email_address,
        password_digest: model.password_digest,
        is_staff: model.is_staff,
        is_admin: model.is_admin,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── VerificationCode repository ──────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationCodeRepository {
    pub db: DatabaseConnection,
}

impl VerificationCodeRepository for DbVerificationCodeRepository {
    async fn create_with_outbox(
        &self,
        code: &VerificationCode,
        event: &OutboxEvent,
    ) -> Result<(), SiteError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let code = code.clone();
                let event = event.clone();
                Box::pin(async move {
                    insert_verification_code(txn, &code).await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .map_err(txn_err)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    SiteError::CodeConflict
                } else {
                    internal(e, "create verification code with outbox")
                }
            })
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        verification_type: VerificationType,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, SiteError> {
        let model = verification_codes::Entity::find()
            .filter(verification_codes::Column::UserId.eq(user_id))
            .filter(verification_codes::Column::VerificationType.eq(verification_type.as_str()))
            .filter(verification_codes::Column::Code.eq(code))
            .filter(verification_codes::Column::UsedAt.is_null())
            .filter(verification_codes::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find active verification code")?;
        Ok(model.map(verification_code_from_model).transpose()?)
    }

    async fn consume_and_promote(
        &self,
        code_id: Uuid,
        user_id: Uuid,
        verification_type: VerificationType,
        now: DateTime<Utc>,
    ) -> Result<bool, SiteError> {
        let flag = match verification_type {
            VerificationType::Staff => users::Column::IsStaff,
            VerificationType::Admin => users::Column::IsAdmin,
        };
        self.db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let consumed = verification_codes::Entity::update_many()
                        .col_expr(verification_codes::Column::UsedAt, Expr::value(now))
                        .filter(verification_codes::Column::Id.eq(code_id))
                        .filter(verification_codes::Column::UsedAt.is_null())
                        .exec(txn)
                        .await?;
                    if consumed.rows_affected == 0 {
                        return Ok(false);
                    }
                    users::Entity::update_many()
                        .col_expr(flag, Expr::value(true))
                        .col_expr(users::Column::UpdatedAt, Expr::value(now))
                        .filter(users::Column::Id.eq(user_id))
                        .exec(txn)
                        .await?;
                    Ok(true)
                })
            })
            .await
            .map_err(txn_err)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    SiteError::CodeConflict
                } else {
                    internal(e, "consume verification code")
                }
            })
    }
}

async fn insert_verification_code(
    txn: &DatabaseTransaction,
    code: &VerificationCode,
) -> Result<(), DbErr> {
    verification_codes::ActiveModel {
        id: Set(code.id),
        user_id: Set(code.user_id),
        verification_type: Set(code.verification_type.as_str().to_owned()),
        code: Set(code.code.clone()),
        expires_at: Set(code.expires_at),
        used_at: Set(None),
        created_at: Set(code.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn verification_code_from_model(
    model: verification_codes::Model,
) -> anyhow::Result<VerificationCode> {
    Ok(VerificationCode {
        id: model.id,
        user_id: model.user_id,
        verification_type: model
            .verification_type
            .parse()
            .context("stored verification type")?,
        code: model.code,
        expires_at: model.expires_at,
        used_at: model.used_at,
        created_at: model.created_at,
    })
}

// ── Contact repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbContactRepository {
    pub db: DatabaseConnection,
}

/// Nine-digit ids always fit in the `integer` primary key.
fn contact_pk(id: ContactId) -> i32 {
    id.get() as i32
}

impl ContactRepository for DbContactRepository {
    async fn exists(&self, id: ContactId) -> Result<bool, SiteError> {
        let model = contacts::Entity::find_by_id(contact_pk(id))
            .one(&self.db)
            .await
            .context("check contact id")?;
        Ok(model.is_some())
    }

    async fn create_with_outbox(
        &self,
        contact: &Contact,
        events: &[OutboxEvent],
    ) -> Result<ContactInsert, SiteError> {
        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                let model = contact_to_active_model(contact);
                let events = events.to_vec();
                Box::pin(async move {
                    model.insert(txn).await?;
                    for event in &events {
                        insert_outbox_event(txn, event).await?;
                    }
                    Ok(())
                })
            })
            .await
            .map_err(txn_err);
        match result {
            Ok(()) => Ok(ContactInsert::Inserted),
            Err(e) if is_unique_violation(&e) => Ok(ContactInsert::IdTaken),
            Err(e) => Err(internal(e, "create contact with outbox")),
        }
    }

    async fn find_by_id(&self, id: ContactId) -> Result<Option<Contact>, SiteError> {
        let model = contacts::Entity::find_by_id(contact_pk(id))
            .one(&self.db)
            .await
            .context("find contact by id")?;
        Ok(model.map(contact_from_model).transpose()?)
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Contact>, SiteError> {
        let models = contacts::Entity::find()
            .order_by_desc(contacts::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list contacts")?;
        Ok(models
            .into_iter()
            .map(contact_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn update(&self, contact: &Contact) -> Result<(), SiteError> {
        contact_to_active_model(contact)
            .update(&self.db)
            .await
            .context("update contact")?;
        Ok(())
    }

    async fn delete(&self, id: ContactId) -> Result<bool, SiteError> {
        let result = contacts::Entity::delete_by_id(contact_pk(id))
            .exec(&self.db)
            .await
            .context("delete contact")?;
        Ok(result.rows_affected > 0)
    }
}

fn contact_to_active_model(contact: &Contact) -> contacts::ActiveModel {
    let f = &contact.fields;
    contacts::ActiveModel {
        id: Set(contact_pk(contact.id)),
        contact_type: Set(f.contact_type.as_str().to_owned()),
        name: Set(f.name.clone()),
        email: Set(f.email.clone()),
        phone: Set(f.phone.clone()),
        message: Set(f.message.clone()),
        preferred_date: Set(f.preferred_date),
        preferred_time: Set(f.preferred_time.clone()),
        status: Set(f.status.as_str().to_owned()),
        created_at: Set(contact.created_at),
        updated_at: Set(contact.updated_at),
    }
}

fn contact_from_model(model: contacts::Model) -> anyhow::Result<Contact> {
    let id = u32::try_from(model.id)
        .ok()
        .and_then(|v| ContactId::new(v).ok())
        .ok_or_else(|| anyhow!("stored contact id {} out of range", model.id))?;
    let contact_type = model
        .contact_type
        .parse()
        .map_err(|()| anyhow!("unknown stored contact type {:?}", model.contact_type))?;
    let status = model
        .status
        .parse()
        .map_err(|()| anyhow!("unknown stored contact status {:?}", model.status))?;
    Ok(Contact {
        id,
        fields: ContactFields {
            name: model.name,
            email: model.email,
            phone: model.phone,
            contact_type,
            message: model.message,
            preferred_date: model.preferred_date,
            preferred_time: model.preferred_time,
            status,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Writing repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbWritingRepository {
    pub db: DatabaseConnection,
}

impl WritingRepository for DbWritingRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Writing>, SiteError> {
        let model = writings::Entity::find()
            .filter(writings::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find writing by slug")?;
        Ok(model.map(writing_from_model).transpose()?)
    }

    async fn list_published(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<Writing>, SiteError> {
        let models = writings::Entity::find()
            .filter(writings::Column::Status.eq(WritingStatus::Published.as_str()))
            .filter(writings::Column::PublishedAt.lte(now))
            .order_by_desc(writings::Column::PublishedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list published writings")?;
        Ok(models
            .into_iter()
            .map(writing_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn list_drafts(&self, page: PageRequest) -> Result<Vec<Writing>, SiteError> {
        let models = writings::Entity::find()
            .filter(writings::Column::Status.eq(WritingStatus::Draft.as_str()))
            .order_by_desc(writings::Column::UpdatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list draft writings")?;
        Ok(models
            .into_iter()
            .map(writing_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn create(&self, writing: &Writing) -> Result<(), SiteError> {
        writing_to_active_model(writing)?
            .insert(&self.db)
            .await
            .map_err(|e| slug_conflict_or(e, "create writing"))?;
        Ok(())
    }

    async fn update(&self, writing: &Writing) -> Result<(), SiteError> {
        writing_to_active_model(writing)?
            .update(&self.db)
            .await
            .map_err(|e| slug_conflict_or(e, "update writing"))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, SiteError> {
        let result = writings::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete writing")?;
        Ok(result.rows_affected > 0)
    }
}

fn slug_conflict_or(err: DbErr, context: &'static str) -> SiteError {
    if is_unique_violation(&err) {
        SiteError::SlugTaken
    } else {
        internal(err, context)
    }
}

fn writing_to_active_model(writing: &Writing) -> anyhow::Result<writings::ActiveModel> {
    let files =
        serde_json::to_value(&writing.downloadable_files).context("encode downloadable files")?;
    Ok(writings::ActiveModel {
        id: Set(writing.id),
        user_id: Set(writing.user_id),
        title: Set(writing.title.clone()),
        slug: Set(writing.slug.clone()),
        status: Set(writing.status.as_str().to_owned()),
        published_at: Set(writing.published_at),
        excerpt: Set(writing.excerpt.clone()),
        content: Set(writing.content.clone()),
        featured_image: Set(writing.featured_image.clone()),
        downloadable_files: Set(files),
        created_at: Set(writing.created_at),
        updated_at: Set(writing.updated_at),
    })
}

fn writing_from_model(model: writings::Model) -> anyhow::Result<Writing> {
    let status = model
        .status
        .parse()
        .map_err(|()| anyhow!("unknown stored writing status {:?}", model.status))?;
    let downloadable_files =
        serde_json::from_value(model.downloadable_files).context("decode downloadable files")?;
    Ok(Writing {
        id: model.id,
        user_id: model.user_id,
        title: model.title,
        slug: model.slug,
        status,
        published_at: model.published_at,
        excerpt: model.excerpt,
        content: model.content,
        featured_image: model.featured_image,
        downloadable_files,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Outbox repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOutboxRepository {
    pub db: DatabaseConnection,
}

impl OutboxRepository for DbOutboxRepository {
    async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<PendingOutboxEvent>, SiteError> {
        let models = outbox_events::Entity::find()
            .filter(outbox_events::Column::ProcessedAt.is_null())
            .filter(outbox_events::Column::FailedAt.is_null())
            .filter(outbox_events::Column::NextAttemptAt.lte(now))
            .order_by_asc(outbox_events::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("fetch due outbox events")?;
        Ok(models
            .into_iter()
            .map(|m| PendingOutboxEvent {
                id: m.id,
                kind: m.kind,
                payload: m.payload,
                attempts: m.attempts,
            })
            .collect())
    }

    async fn mark_processed(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), SiteError> {
        outbox_events::ActiveModel {
            id: Set(id),
            processed_at: Set(Some(now)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark outbox event processed")?;
        Ok(())
    }

    async fn schedule_retry(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), SiteError> {
        outbox_events::ActiveModel {
            id: Set(id),
            attempts: Set(attempts),
            last_error: Set(Some(error.to_owned())),
            next_attempt_at: Set(next_attempt_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("schedule outbox retry")?;
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SiteError> {
        outbox_events::ActiveModel {
            id: Set(id),
            attempts: Set(attempts),
            last_error: Set(Some(error.to_owned())),
            failed_at: Set(Some(now)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark outbox event failed")?;
        Ok(())
    }
}
