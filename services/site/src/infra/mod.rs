pub mod db;
pub mod mailer;
pub mod outbox;
pub mod password;
pub mod rate_limit;
