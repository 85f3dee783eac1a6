//! Writings: slug-addressed articles with draft and scheduled publication.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use deunicode::deunicode;
use serde::{Deserialize, Serialize};

use crate::validation::{BLANK, ValidationErrors, is_blank};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritingStatus {
    #[default]
    Draft,
    Published,
}

impl WritingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for WritingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WritingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            _ => Err(()),
        }
    }
}

/// URL slug for a title: transliterated to ASCII, lowercase alphanumerics,
/// every other run of characters collapsed to a single `-`, no leading or
/// trailing `-`.
///
/// ```
/// use wrantle_domain::writing::slugify;
/// assert_eq!(slugify("  Building for Tomorrow: Part 2! "), "building-for-tomorrow-part-2");
/// assert_eq!(slugify("Café Résumé"), "cafe-resume");
/// ```
pub fn slugify(title: &str) -> String {
    let ascii = deunicode(title);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Slugs stay stable across edits unless the title changed or none exists yet.
pub fn needs_new_slug(previous_title: &str, title: &str, current_slug: &str) -> bool {
    previous_title != title || is_blank(current_slug)
}

/// Publicly visible: published, with a publish time that has arrived.
///
/// A published writing with a future (or missing) `published_at` stays hidden
/// until the clock passes it; no further write is needed.
pub fn is_visible(
    status: WritingStatus,
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    status == WritingStatus::Published && published_at.is_some_and(|at| at <= now)
}

/// Title must be present and must yield a non-empty slug.
pub fn validate_title(title: &str, slug: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if is_blank(title) {
        errors.add("title", BLANK);
    }
    if is_blank(slug) {
        errors.add("slug", BLANK);
    }
    errors.into_result()
}
