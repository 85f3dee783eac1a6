use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use wrantle_domain::contact::NOT_INCLUDED;
use wrantle_domain::pagination::PageRequest;
use wrantle_domain::validation::{INVALID, ValidationErrors};
use wrantle_domain::writing::{WritingStatus, needs_new_slug, slugify, validate_title};

use crate::domain::repository::{UserRepository, WritingRepository};
use crate::domain::types::Writing;
use crate::error::SiteError;
use crate::usecase::user::{is_editor, require_editor};

/// Writing fields as submitted. On update, absent fields keep their stored value.
///
/// Nullable fields are doubly optional: `Some(None)` clears the stored value.
/// `published_at` is raw RFC 3339 text so a bad value becomes a field error.
#[derive(Debug, Clone, Default)]
pub struct WritingInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub published_at: Option<Option<String>>,
    pub excerpt: Option<Option<String>>,
    pub featured_image: Option<Option<String>>,
    pub downloadable_files: Option<Vec<String>>,
}

/// `None` when the text is not RFC 3339. Blank or `null` clears the date.
fn parse_published_at(
    raw: Option<&str>,
    errors: &mut ValidationErrors,
) -> Option<Option<DateTime<Utc>>> {
    match raw.map(str::trim) {
        None | Some("") => Some(None),
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(at) => Some(Some(at.with_timezone(&Utc))),
            Err(_) => {
                errors.add("published_at", INVALID);
                None
            }
        },
    }
}

fn parse_status(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<WritingStatus> {
    let raw = raw?.trim();
    match raw.parse() {
        Ok(status) => Some(status),
        Err(()) => {
            errors.add("status", NOT_INCLUDED);
            None
        }
    }
}

/// Apply `input` over `writing`, re-deriving the slug when the title changed or
/// none is stored, then validate the result.
fn apply_input(writing: &mut Writing, input: WritingInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Some(title) = input.title {
        let title = title.trim().to_owned();
        if needs_new_slug(&writing.title, &title, &writing.slug) {
            writing.slug = slugify(&title);
        }
        writing.title = title;
    }
    if let Some(status) = parse_status(input.status.as_deref(), &mut errors) {
        writing.status = status;
    }
    if let Some(content) = input.content {
        writing.content = content;
    }
    if let Some(raw) = input.published_at {
        if let Some(at) = parse_published_at(raw.as_deref(), &mut errors) {
            writing.published_at = at;
        }
    }
    if let Some(excerpt) = input.excerpt {
        writing.excerpt = excerpt;
    }
    if let Some(image) = input.featured_image {
        writing.featured_image = image;
    }
    if let Some(files) = input.downloadable_files {
        writing.downloadable_files = files;
    }

    if let Err(title_errors) = validate_title(&writing.title, &writing.slug) {
        errors.merge(title_errors);
    }
    errors.into_result()
}

pub struct CreateWritingUseCase<U, W>
where
    U: UserRepository,
    W: WritingRepository,
{
    pub users: U,
    pub writings: W,
}

impl<U, W> CreateWritingUseCase<U, W>
where
    U: UserRepository,
    W: WritingRepository,
{
    pub async fn execute(&self, actor: Uuid, input: WritingInput) -> Result<Writing, SiteError> {
        let author = require_editor(&self.users, actor).await?;
        let now = Utc::now();
        let mut writing = Writing {
            id: Uuid::now_v7(),
            user_id: author.id,
            title: String::new(),
            slug: String::new(),
            status: WritingStatus::default(),
            published_at: None,
            excerpt: None,
            content: String::new(),
            featured_image: None,
            downloadable_files: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        apply_input(&mut writing, input)?;

        self.writings.create(&writing).await?;
        info!(
            writing_id = %writing.id,
            slug = %writing.slug,
            status = %writing.status,
            "writing created"
        );
        Ok(writing)
    }
}

pub struct UpdateWritingUseCase<U, W>
where
    U: UserRepository,
    W: WritingRepository,
{
    pub users: U,
    pub writings: W,
}

impl<U, W> UpdateWritingUseCase<U, W>
where
    U: UserRepository,
    W: WritingRepository,
{
    pub async fn execute(
        &self,
        actor: Uuid,
        slug: &str,
        input: WritingInput,
    ) -> Result<Writing, SiteError> {
        require_editor(&self.users, actor).await?;
        let mut writing = self
            .writings
            .find_by_slug(slug)
            .await?
            .ok_or(SiteError::WritingNotFound)?;

        apply_input(&mut writing, input)?;
        writing.updated_at = Utc::now();

        self.writings.update(&writing).await?;
        info!(
            writing_id = %writing.id,
            slug = %writing.slug,
            status = %writing.status,
            "writing updated"
        );
        Ok(writing)
    }
}

pub struct DeleteWritingUseCase<U, W>
where
    U: UserRepository,
    W: WritingRepository,
{
    pub users: U,
    pub writings: W,
}

impl<U, W> DeleteWritingUseCase<U, W>
where
    U: UserRepository,
    W: WritingRepository,
{
    pub async fn execute(&self, actor: Uuid, slug: &str) -> Result<(), SiteError> {
        require_editor(&self.users, actor).await?;
        let writing = self
            .writings
            .find_by_slug(slug)
            .await?
            .ok_or(SiteError::WritingNotFound)?;
        if !self.writings.delete(writing.id).await? {
            return Err(SiteError::WritingNotFound);
        }
        info!(writing_id = %writing.id, slug = %writing.slug, "writing deleted");
        Ok(())
    }
}

pub struct ShowWritingUseCase<U, W>
where
    U: UserRepository,
    W: WritingRepository,
{
    pub users: U,
    pub writings: W,
}

impl<U, W> ShowWritingUseCase<U, W>
where
    U: UserRepository,
    W: WritingRepository,
{
    /// Unpublished and scheduled writings are only shown to editors.
    pub async fn execute(&self, actor: Option<Uuid>, slug: &str) -> Result<Writing, SiteError> {
        let writing = self
            .writings
            .find_by_slug(slug)
            .await?
            .ok_or(SiteError::WritingNotFound)?;
        if writing.is_visible(Utc::now()) || is_editor(&self.users, actor).await? {
            Ok(writing)
        } else {
            Err(SiteError::WritingNotFound)
        }
    }
}

pub struct ListPublishedWritingsUseCase<W: WritingRepository> {
    pub writings: W,
}

impl<W: WritingRepository> ListPublishedWritingsUseCase<W> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<Writing>, SiteError> {
        self.writings
            .list_published(Utc::now(), page.clamped())
            .await
    }
}

pub struct ListDraftWritingsUseCase<U, W>
where
    U: UserRepository,
    W: WritingRepository,
{
    pub users: U,
    pub writings: W,
}

impl<U, W> ListDraftWritingsUseCase<U, W>
where
    U: UserRepository,
    W: WritingRepository,
{
    pub async fn execute(&self, actor: Uuid, page: PageRequest) -> Result<Vec<Writing>, SiteError> {
        require_editor(&self.users, actor).await?;
        self.writings.list_drafts(page.clamped()).await
    }
}
