use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceDay::Table)
                    .if_not_exists()
                    .col(uuid(ServiceDay::Id).primary_key())
                    .col(uuid(ServiceDay::ServiceOrderId).not_null())
                    .col(date(ServiceDay::Day).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_day_service_order")
                            .from(ServiceDay::Table, ServiceDay::ServiceOrderId)
                            .to(ServiceOrder::Table, ServiceOrder::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceDay::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceDay { Table, Id, ServiceOrderId, Day }

#[derive(DeriveIden)]
enum ServiceOrder { Table, Id }
