pub use sea_orm_migration::prelude::*;

mod m20251101_000001_create_users;
mod m20251101_000002_create_verification_codes;
mod m20251101_000003_create_contacts;
mod m20251101_000004_create_writings;
mod m20251101_000005_create_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000001_create_users::Migration),
            Box::new(m20251101_000002_create_verification_codes::Migration),
            Box::new(m20251101_000003_create_contacts::Migration),
            Box::new(m20251101_000004_create_writings::Migration),
            Box::new(m20251101_000005_create_outbox_events::Migration),
        ]
    }
}
