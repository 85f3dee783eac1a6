pub mod contact;
pub mod registration;
pub mod user;
pub mod verification;
pub mod writing;
