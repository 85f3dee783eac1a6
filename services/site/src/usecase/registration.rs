use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use wrantle_domain::user::{MIN_PASSWORD_LEN, is_valid_email, normalize_email};
use wrantle_domain::validation::{BLANK, INVALID, ValidationErrors, is_blank};

use crate::domain::repository::{PasswordHasher, UserRepository};
use crate::domain::types::User;
use crate::error::SiteError;

pub struct RegisterInput {
    pub email_address: String,
    pub password: String,
    pub password_confirmation: Option<String>,
}

/// Field-level checks that need no storage access.
fn validate(input: &RegisterInput, email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if is_blank(email) {
        errors.add("email_address", BLANK);
    } else if !is_valid_email(email) {
        errors.add("email_address", INVALID);
    }

    if input.password.is_empty() {
        errors.add("password", BLANK);
    } else if input.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("is too short (minimum is {MIN_PASSWORD_LEN} characters)"),
        );
    }

    match input.password_confirmation.as_deref() {
        None | Some("") => errors.add("password_confirmation", BLANK),
        Some(confirmation) if confirmation != input.password => {
            errors.add("password_confirmation", "doesn't match Password")
        }
        Some(_) => {}
    }

    errors.into_result()
}

pub struct RegisterUseCase<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    pub users: U,
    pub hasher: H,
}

impl<U, H> RegisterUseCase<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<User, SiteError> {
        let email = normalize_email(&input.email_address);
        validate(&input, &email)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(SiteError::EmailTaken);
        }

        let password_digest = self.hasher.hash(&input.password).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email_address: email,
            password_digest,
            is_staff: false,
            is_admin: false,
            created_at: now,
            updated_at: now,
        };

        // A concurrent registration can still win the race; the unique index
        // turns that into `EmailTaken` too.
        self.users.create(&user).await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}
