use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use wrantle_core::error::ErrorResponse;
use wrantle_domain::validation::ValidationErrors;

/// Site service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),
    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),
    #[error("invalid or expired verification code")]
    InvalidVerificationCode,
    #[error("only @{0} email addresses can request verification")]
    IneligibleDomain(String),
    #[error("verification code conflict")]
    CodeConflict,
    #[error("user not found")]
    UserNotFound,
    #[error("contact not found")]
    ContactNotFound,
    #[error("writing not found")]
    WritingNotFound,
    #[error("email address has already been taken")]
    EmailTaken,
    #[error("slug has already been taken")]
    SlugTaken,
    #[error("you must be both staff and admin to perform this action")]
    Forbidden,
    #[error("too many requests")]
    RateLimited,
    #[error("could not allocate a contact id")]
    ContactIdExhausted,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl SiteError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::InvalidVerificationCode => "INVALID_VERIFICATION_CODE",
            Self::IneligibleDomain(_) => "INELIGIBLE_DOMAIN",
            Self::CodeConflict => "CODE_CONFLICT",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ContactNotFound => "CONTACT_NOT_FOUND",
            Self::WritingNotFound => "WRITING_NOT_FOUND",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::SlugTaken => "SLUG_TAKEN",
            Self::Forbidden => "FORBIDDEN",
            Self::RateLimited => "RATE_LIMITED",
            Self::ContactIdExhausted => "CONTACT_ID_EXHAUSTED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidBody(rejection) => rejection.status(),
            Self::InvalidVerificationCode
            | Self::UserNotFound
            | Self::ContactNotFound
            | Self::WritingNotFound => StatusCode::NOT_FOUND,
            Self::IneligibleDomain(_) | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::CodeConflict | Self::EmailTaken | Self::SlugTaken => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::ContactIdExhausted => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let response = ErrorResponse::new(self.status(), self.kind(), self.to_string());
        let response = match self {
            Self::Validation(errors) => response.with_errors(errors.to_json()),
            // The anyhow chain goes to the log so the root cause is traceable.
            Self::Internal(e) => response.with_source(e),
            _ => response,
        };
        response.into_response()
    }
}
