//! Proxy-injected identity header extractor.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-wrantle-user-id";

/// Signed-in user identity, injected by the front proxy via `x-wrantle-user-id`.
///
/// Returns 401 if the header is absent or cannot be parsed as UUID.
/// Privilege checks (403) are done by use cases after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityHeaders {
    pub user_id: Uuid,
}

/// `None` when the header is absent, `Some(Err)` when it is present but malformed.
fn read_user_id(parts: &Parts) -> Option<Result<Uuid, StatusCode>> {
    parts.headers.get(USER_ID_HEADER).map(|v| {
        v.to_str()
            .ok()
            .and_then(|s| s.parse::<Uuid>().ok())
            .ok_or(StatusCode::UNAUTHORIZED)
    })
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 declares `fn -> impl Future + Send`; read the headers
    // synchronously and return a 'static future.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = read_user_id(parts);

        async move {
            let user_id = user_id.ok_or(StatusCode::UNAUTHORIZED)??;
            Ok(Self { user_id })
        }
    }
}

/// Anonymous requests extract as `None`; a malformed header is still a 401.
impl<S> OptionalFromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Option<Self>, Self::Rejection>> + Send {
        let user_id = read_user_id(parts);

        async move {
            match user_id {
                None => Ok(None),
                Some(id) => Ok(Some(Self { user_id: id? })),
            }
        }
    }
}
