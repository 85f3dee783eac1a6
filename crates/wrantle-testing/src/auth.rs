//! Mock auth helpers for integration tests.
//!
//! Services receive the `x-wrantle-user-id` header from the front proxy once a
//! session is authenticated. `MockAuth` injects it directly so no real session
//! store is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;
use wrantle_auth_types::identity::USER_ID_HEADER;

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
}

impl MockAuth {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    pub fn header_name(&self) -> HeaderName {
        HeaderName::from_static(USER_ID_HEADER)
    }

    pub fn header_value(&self) -> HeaderValue {
        HeaderValue::from_str(&self.user_id.to_string()).unwrap()
    }

    /// Return headers as if the proxy injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(self.header_name(), self.header_value());
        map
    }
}
