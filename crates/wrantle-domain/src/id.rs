//! Newtype wrappers for domain identifiers.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every contact id is exactly nine decimal digits.
pub const CONTACT_ID_RANGE: RangeInclusive<u32> = 100_000_000..=999_999_999;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactIdError {
    #[error("contact id is not a number")]
    NotANumber,
    #[error("contact id must have exactly nine digits")]
    OutOfRange,
}

/// Identifies a contact request. Always a 9-digit number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContactId(u32);

impl ContactId {
    pub fn new(value: u32) -> Result<Self, ContactIdError> {
        if CONTACT_ID_RANGE.contains(&value) {
            Ok(Self(value))
        } else {
            Err(ContactIdError::OutOfRange)
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ContactId {
    type Err = ContactIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.parse().map_err(|_| ContactIdError::NotANumber)?;
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for ContactId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
