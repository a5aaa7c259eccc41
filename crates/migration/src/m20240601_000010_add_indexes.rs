use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Department: ranking lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_department_production_order")
                    .table(Department::Table)
                    .col(Department::ProductionOrder)
                    .to_owned(),
            )
            .await?;

        // EmployeeDepartment: one link per pair
        manager
            .create_index(
                Index::create()
                    .name("uniq_employee_department")
                    .table(EmployeeDepartment::Table)
                    .col(EmployeeDepartment::EmployeeId)
                    .col(EmployeeDepartment::DepartmentId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_employee_department_department")
                    .table(EmployeeDepartment::Table)
                    .col(EmployeeDepartment::DepartmentId)
                    .to_owned(),
            )
            .await?;

        // ServiceOrderDepartment: a department appears once per order
        manager
            .create_index(
                Index::create()
                    .name("uniq_sod_order_department")
                    .table(ServiceOrderDepartment::Table)
                    .col(ServiceOrderDepartment::ServiceOrderId)
                    .col(ServiceOrderDepartment::DepartmentId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_sod_department")
                    .table(ServiceOrderDepartment::Table)
                    .col(ServiceOrderDepartment::DepartmentId)
                    .to_owned(),
            )
            .await?;

        // ServiceOrderCollaborator: a collaborator appears once per order department
        manager
            .create_index(
                Index::create()
                    .name("uniq_soc_order_department_employee")
                    .table(ServiceOrderCollaborator::Table)
                    .col(ServiceOrderCollaborator::ServiceOrderId)
                    .col(ServiceOrderCollaborator::DepartmentId)
                    .col(ServiceOrderCollaborator::EmployeeId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_soc_employee")
                    .table(ServiceOrderCollaborator::Table)
                    .col(ServiceOrderCollaborator::EmployeeId)
                    .to_owned(),
            )
            .await?;

        // ServiceDay: unique per order, searchable by day
        manager
            .create_index(
                Index::create()
                    .name("uniq_service_day_order_day")
                    .table(ServiceDay::Table)
                    .col(ServiceDay::ServiceOrderId)
                    .col(ServiceDay::Day)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_day_day")
                    .table(ServiceDay::Table)
                    .col(ServiceDay::Day)
                    .to_owned(),
            )
            .await?;

        // ServiceOrder: status filter
        manager
            .create_index(
                Index::create()
                    .name("idx_service_order_status")
                    .table(ServiceOrder::Table)
                    .col(ServiceOrder::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_department_production_order").table(Department::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_employee_department").table(EmployeeDepartment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_employee_department_department").table(EmployeeDepartment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_sod_order_department").table(ServiceOrderDepartment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_sod_department").table(ServiceOrderDepartment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_soc_order_department_employee").table(ServiceOrderCollaborator::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_soc_employee").table(ServiceOrderCollaborator::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_service_day_order_day").table(ServiceDay::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_day_day").table(ServiceDay::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_order_status").table(ServiceOrder::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Department { Table, ProductionOrder }

#[derive(DeriveIden)]
enum EmployeeDepartment { Table, EmployeeId, DepartmentId }

#[derive(DeriveIden)]
enum ServiceOrder { Table, Status }

#[derive(DeriveIden)]
enum ServiceOrderDepartment { Table, ServiceOrderId, DepartmentId }

#[derive(DeriveIden)]
enum ServiceOrderCollaborator { Table, ServiceOrderId, DepartmentId, EmployeeId }

#[derive(DeriveIden)]
enum ServiceDay { Table, ServiceOrderId, Day }
