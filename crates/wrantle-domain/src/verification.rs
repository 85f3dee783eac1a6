//! Staff/admin verification codes.
//!
//! Lifecycle: `Active` (unused, before expiry) → `Used` (terminal), or
//! `Active` → `Expired` (terminal, implied by the clock, never written).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Verification code length in characters.
pub const CODE_LEN: usize = 6;

/// Uppercase hexadecimal alphabet used for codes.
pub const CODE_CHARSET: &[u8] = b"0123456789ABCDEF";

/// Code time-to-live in minutes.
pub const CODE_TTL_MINUTES: i64 = 30;

/// Privilege a verification code grants once consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationType {
    Staff,
    Admin,
}

impl VerificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    /// Title-cased label used in mail subjects.
    pub fn title(self) -> &'static str {
        match self {
            Self::Staff => "Staff",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for VerificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown verification type: {0}")]
pub struct UnknownVerificationType(pub String);

impl FromStr for VerificationType {
    type Err = UnknownVerificationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownVerificationType(other.to_owned())),
        }
    }
}

/// Expiry instant for a code issued at `issued_at`.
pub fn expiry_for(issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + Duration::minutes(CODE_TTL_MINUTES)
}

/// True for exactly [`CODE_LEN`] characters from [`CODE_CHARSET`].
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| CODE_CHARSET.contains(&b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeState {
    Active,
    Used,
    Expired,
}

impl CodeState {
    /// `Used` wins over `Expired`: a consumed code stays consumed.
    pub fn at(
        used_at: Option<DateTime<Utc>>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        if used_at.is_some() {
            Self::Used
        } else if expires_at > now {
            Self::Active
        } else {
            Self::Expired
        }
    }
}
