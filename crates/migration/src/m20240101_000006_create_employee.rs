//! Create `employee` table with FK to `tenant`.
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
                    .col(uuid(Employee::TenantId).not_null())
                    .col(string_len(Employee::EmployeeNo, 32).not_null())
                    .col(string_len(Employee::Name, 128).not_null())
                    .col(string_len(Employee::Email, 255).not_null())
                    .col(ColumnDef::new(Employee::Department).string_len(64).null())
                    .col(date(Employee::HiredOn).not_null())
                    .col(timestamp_with_time_zone(Employee::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Employee::UpdatedAt).not_null())
                    .col(uuid(Employee::CreatedBy).not_null())
                    .col(uuid(Employee::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(Employee::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(Employee::Version).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_tenant")
                            .from(Employee::Table, Employee::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Employee::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Employee {
    Table,
    Id,
    TenantId,
    EmployeeNo,
    Name,
    Email,
    Department,
    HiredOn,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    DeletedAt,
    Version,
}

#[derive(DeriveIden)]
enum Tenant { Table, Id }
