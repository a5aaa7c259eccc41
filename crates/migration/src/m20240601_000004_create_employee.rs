//! Create `employee` table.
//!
//! Shift columns are nullable: an employee without a fixed schedule has neither.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employee::Table)
                    .if_not_exists()
                    .col(uuid(Employee::Id).primary_key())
                    .col(string_len(Employee::Name, 128).not_null())
                    .col(ColumnDef::new(Employee::Email).string_len(255).null())
                    .col(ColumnDef::new(Employee::Role).string_len(64).null())
                    .col(ColumnDef::new(Employee::ShiftStart).time().null())
                    .col(ColumnDef::new(Employee::ShiftEnd).time().null())
                    .col(boolean(Employee::Active).not_null().default(true))
                    .col(timestamp_with_time_zone(Employee::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Employee::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Employee::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Employee { Table, Id, Name, Email, Role, ShiftStart, ShiftEnd, Active, CreatedAt, UpdatedAt }
