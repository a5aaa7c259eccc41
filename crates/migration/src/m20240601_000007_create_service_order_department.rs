//! Create `service_order_department`: one execution window per department of an order.
//!
//! Departments are RESTRICTed so a referenced department cannot disappear
//! from under a scheduled order.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceOrderDepartment::Table)
                    .if_not_exists()
                    .col(uuid(ServiceOrderDepartment::Id).primary_key())
                    .col(uuid(ServiceOrderDepartment::ServiceOrderId).not_null())
                    .col(uuid(ServiceOrderDepartment::DepartmentId).not_null())
                    .col(timestamp_with_time_zone(ServiceOrderDepartment::StartAt).not_null())
                    .col(timestamp_with_time_zone(ServiceOrderDepartment::EndAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sod_service_order")
                            .from(ServiceOrderDepartment::Table, ServiceOrderDepartment::ServiceOrderId)
                            .to(ServiceOrder::Table, ServiceOrder::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sod_department")
                            .from(ServiceOrderDepartment::Table, ServiceOrderDepartment::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceOrderDepartment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceOrderDepartment { Table, Id, ServiceOrderId, DepartmentId, StartAt, EndAt }

#[derive(DeriveIden)]
enum ServiceOrder { Table, Id }

#[derive(DeriveIden)]
enum Department { Table, Id }
