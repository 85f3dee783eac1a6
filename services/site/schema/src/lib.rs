//! SeaORM entities for the site service.

pub mod contacts;
pub mod outbox_events;
pub mod users;
pub mod verification_codes;
pub mod writings;
