//! Create `service_order` table (parent of the scheduling aggregate).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceOrder::Table)
                    .if_not_exists()
                    .col(uuid(ServiceOrder::Id).primary_key())
                    .col(string_len(ServiceOrder::Code, 64).unique_key().not_null())
                    .col(string_len(ServiceOrder::Title, 255).not_null())
                    .col(ColumnDef::new(ServiceOrder::Client).string_len(255).null())
                    .col(ColumnDef::new(ServiceOrder::Description).text().null())
                    .col(string_len(ServiceOrder::Status, 32).not_null())
                    .col(ColumnDef::new(ServiceOrder::CreatedBy).uuid().null())
                    .col(timestamp_with_time_zone(ServiceOrder::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceOrder::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_order_created_by")
                            .from(ServiceOrder::Table, ServiceOrder::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceOrder::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceOrder { Table, Id, Code, Title, Client, Description, Status, CreatedBy, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
