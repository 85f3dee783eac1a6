use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::SiteError;

/// Load the acting user and require both staff and admin privileges.
///
/// An identity that no longer resolves to a user is treated like any other
/// unprivileged caller.
pub async fn require_editor<U: UserRepository>(users: &U, user_id: Uuid) -> Result<User, SiteError> {
    let user = users.find_by_id(user_id).await?.ok_or(SiteError::Forbidden)?;
    if !user.privileges().is_editor() {
        return Err(SiteError::Forbidden);
    }
    Ok(user)
}

/// Whether an optional acting user may see unpublished content.
pub async fn is_editor<U: UserRepository>(
    users: &U,
    user_id: Option<Uuid>,
) -> Result<bool, SiteError> {
    let Some(user_id) = user_id else {
        return Ok(false);
    };
    Ok(users
        .find_by_id(user_id)
        .await?
        .is_some_and(|u| u.privileges().is_editor()))
}

pub struct GetMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetMeUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, SiteError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(SiteError::UserNotFound)
    }
}
