use axum::extract::FromRequest;

use crate::error::SiteError;

pub mod contact;
pub mod health;
pub mod registration;
pub mod user;
pub mod verification;
pub mod writing;

/// `axum::Json` whose rejection renders as a [`SiteError`] body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(SiteError))]
pub struct AppJson<T>(pub T);
