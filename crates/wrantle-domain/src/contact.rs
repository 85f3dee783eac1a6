//! Contact requests submitted through the public site.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::user::is_valid_email;
use crate::validation::{BLANK, INVALID, MUST_BE_BLANK, ValidationErrors, is_blank};

pub const NOT_INCLUDED: &str = "is not included in the list";

const PREFERRED_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactType {
    ScheduleChat,
    RequestInfo,
    NeedsAssessment,
}

impl ContactType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScheduleChat => "schedule_chat",
            Self::RequestInfo => "request_info",
            Self::NeedsAssessment => "needs_assessment",
        }
    }

    /// Sentence-cased label for mail subjects ("Schedule chat").
    pub fn humanize(self) -> &'static str {
        match self {
            Self::ScheduleChat => "Schedule chat",
            Self::RequestInfo => "Request info",
            Self::NeedsAssessment => "Needs assessment",
        }
    }

    /// Only chat scheduling asks for a preferred date and time.
    pub fn requires_preferred_slot(self) -> bool {
        matches!(self, Self::ScheduleChat)
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "schedule_chat" => Ok(Self::ScheduleChat),
            "request_info" => Ok(Self::RequestInfo),
            "needs_assessment" => Ok(Self::NeedsAssessment),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    Pending,
    Contacted,
    Closed,
}

impl ContactStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Contacted => "contacted",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "contacted" => Ok(Self::Contacted),
            "closed" => Ok(Self::Closed),
            _ => Err(()),
        }
    }
}

/// Raw contact form input, as submitted.
///
/// `contact_email_confirm` is a honeypot: humans never see the field, so any
/// content in it marks the submission as automated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub contact_type: Option<String>,
    #[serde(default)]
    pub message: String,
    /// `YYYY-MM-DD`. Kept raw so a bad value surfaces as a field error.
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub status: Option<String>,
    #[serde(default, alias = "website")]
    pub contact_email_confirm: Option<String>,
}

/// A contact form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub contact_type: ContactType,
    pub message: String,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub status: ContactStatus,
}

impl ContactForm {
    /// Check every field and produce typed values, or all field errors at once.
    pub fn validate(self) -> Result<ContactFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require("name", &self.name);
        errors.require("phone", &self.phone);
        errors.require("message", &self.message);

        let email = self.email.trim().to_owned();
        if is_blank(&email) {
            errors.require("email", &email);
        } else if !is_valid_email(&email) {
            errors.add("email", INVALID);
        }

        let contact_type = match self.contact_type.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add("contact_type", BLANK);
                None
            }
            Some(raw) => match raw.parse::<ContactType>() {
                Ok(t) => Some(t),
                Err(()) => {
                    errors.add("contact_type", NOT_INCLUDED);
                    None
                }
            },
        };

        let preferred_date = match self.preferred_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match NaiveDate::parse_from_str(raw, PREFERRED_DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("preferred_date", INVALID);
                    None
                }
            },
        };
        let preferred_time = self
            .preferred_time
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty());
        if contact_type.is_some_and(ContactType::requires_preferred_slot) {
            if preferred_date.is_none() && !errors.has("preferred_date") {
                errors.add("preferred_date", BLANK);
            }
            errors.require_some("preferred_time", preferred_time.as_deref());
        }

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => ContactStatus::default(),
            Some(raw) => raw.parse().unwrap_or_else(|()| {
                errors.add("status", NOT_INCLUDED);
                ContactStatus::default()
            }),
        };

        if self
            .contact_email_confirm
            .as_deref()
            .is_some_and(|v| !is_blank(v))
        {
            errors.add("contact_email_confirm", MUST_BE_BLANK);
        }

        errors.into_result()?;
        let contact_type = contact_type.ok_or_else(ValidationErrors::new)?;

        Ok(ContactFields {
            name: self.name.trim().to_owned(),
            email,
            phone: self.phone.trim().to_owned(),
            contact_type,
            message: self.message.trim().to_owned(),
            preferred_date,
            preferred_time,
            status,
        })
    }
}

impl ContactFields {
    /// Back to form shape, for merging a partial update before re-validating.
    pub fn to_form(&self) -> ContactForm {
        ContactForm {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            contact_type: Some(self.contact_type.as_str().to_owned()),
            message: self.message.clone(),
            preferred_date: self
                .preferred_date
                .map(|d| d.format(PREFERRED_DATE_FORMAT).to_string()),
            preferred_time: self.preferred_time.clone(),
            status: Some(self.status.as_str().to_owned()),
            contact_email_confirm: None,
        }
    }
}
