//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_user;
mod m20240601_000002_create_user_credentials;
mod m20240601_000003_create_department;
mod m20240601_000004_create_employee;
mod m20240601_000005_create_employee_department;
mod m20240601_000006_create_service_order;
mod m20240601_000007_create_service_order_department;
mod m20240601_000008_create_service_order_collaborator;
mod m20240601_000009_create_service_day;
mod m20240601_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_user::Migration),
            Box::new(m20240601_000002_create_user_credentials::Migration),
            Box::new(m20240601_000003_create_department::Migration),
            Box::new(m20240601_000004_create_employee::Migration),
            Box::new(m20240601_000005_create_employee_department::Migration),
            Box::new(m20240601_000006_create_service_order::Migration),
            Box::new(m20240601_000007_create_service_order_department::Migration),
            Box::new(m20240601_000008_create_service_order_collaborator::Migration),
            Box::new(m20240601_000009_create_service_day::Migration),
            // Indexes should always be applied last
            Box::new(m20240601_000010_add_indexes::Migration),
        ]
    }
}
