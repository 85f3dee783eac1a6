//! Domain types shared across Wrantle services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod contact;
pub mod id;
pub mod pagination;
pub mod user;
pub mod validation;
pub mod verification;
pub mod writing;
