use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmployeeDepartment::Table)
                    .if_not_exists()
                    .col(uuid(EmployeeDepartment::Id).primary_key())
                    .col(uuid(EmployeeDepartment::EmployeeId).not_null())
                    .col(uuid(EmployeeDepartment::DepartmentId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_department_employee")
                            .from(EmployeeDepartment::Table, EmployeeDepartment::EmployeeId)
                            .to(Employee::Table, Employee::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_department_department")
                            .from(EmployeeDepartment::Table, EmployeeDepartment::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(EmployeeDepartment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum EmployeeDepartment { Table, Id, EmployeeId, DepartmentId }

#[derive(DeriveIden)]
enum Employee { Table, Id }

#[derive(DeriveIden)]
enum Department { Table, Id }
