use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceOrderCollaborator::Table)
                    .if_not_exists()
                    .col(uuid(ServiceOrderCollaborator::Id).primary_key())
                    .col(uuid(ServiceOrderCollaborator::ServiceOrderId).not_null())
                    .col(uuid(ServiceOrderCollaborator::DepartmentId).not_null())
                    .col(uuid(ServiceOrderCollaborator::EmployeeId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_soc_service_order")
                            .from(ServiceOrderCollaborator::Table, ServiceOrderCollaborator::ServiceOrderId)
                            .to(ServiceOrder::Table, ServiceOrder::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_soc_department")
                            .from(ServiceOrderCollaborator::Table, ServiceOrderCollaborator::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_soc_employee")
                            .from(ServiceOrderCollaborator::Table, ServiceOrderCollaborator::EmployeeId)
                            .to(Employee::Table, Employee::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceOrderCollaborator::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceOrderCollaborator { Table, Id, ServiceOrderId, DepartmentId, EmployeeId }

#[derive(DeriveIden)]
enum ServiceOrder { Table, Id }

#[derive(DeriveIden)]
enum Department { Table, Id }

#[derive(DeriveIden)]
enum Employee { Table, Id }
