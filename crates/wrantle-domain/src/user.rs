//! User domain types and email rules.

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 10;

/// Canonical stored form of an email address: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// RFC 5322-shaped address check.
pub fn is_valid_email(email: &str) -> bool {
    EmailAddress::is_valid(email)
}

/// True when `email` is an address at exactly `domain` (no subdomains).
///
/// Both sides are compared case-insensitively; `domain` may be given with or
/// without a leading `@`.
pub fn belongs_to_domain(email: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches('@');
    if domain.is_empty() {
        return false;
    }
    match normalize_email(email).rsplit_once('@') {
        Some((local, host)) => !local.is_empty() && host.eq_ignore_ascii_case(domain),
        None => false,
    }
}

/// Privilege flags granted through code verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Privileges {
    pub is_staff: bool,
    pub is_admin: bool,
}

impl Privileges {
    /// Editors may manage writings and contact requests.
    pub fn is_editor(self) -> bool {
        self.is_staff && self.is_admin
    }
}
