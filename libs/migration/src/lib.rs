pub use sea_orm_migration::prelude::*;

mod m20260101_000000_create_users;
mod m20260101_000001_create_phones;
mod m20260101_000002_create_user_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000000_create_users::Migration),
            Box::new(m20260101_000001_create_phones::Migration),
            Box::new(m20260101_000002_create_user_logs::Migration),
        ]
    }
}
