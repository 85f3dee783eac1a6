//! Auth types shared across Wrantle services.
//!
//! Provides the `IdentityHeaders` extractor for the session identity the
//! front proxy injects after authenticating a request.

pub mod identity;
