use sea_orm_migration::prelude::*;

mod m20251101_000001_create_admin_users;
mod m20251101_000002_create_events;
mod m20251101_000003_create_participants;
mod m20251101_000004_create_pairings;
mod m20251101_000005_create_auth_codes;
mod m20251101_000006_create_system_settings;
mod m20251101_000007_create_audit_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000001_create_admin_users::Migration),
            Box::new(m20251101_000002_create_events::Migration),
            Box::new(m20251101_000003_create_participants::Migration),
            Box::new(m20251101_000004_create_pairings::Migration),
            Box::new(m20251101_000005_create_auth_codes::Migration),
            Box::new(m20251101_000006_create_system_settings::Migration),
            Box::new(m20251101_000007_create_audit_logs::Migration),
        ]
    }
}
