//! Create `customer` table with FK to `tenant`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(uuid(Customer::Id).primary_key())
                    .col(uuid(Customer::TenantId).not_null())
                    .col(string_len(Customer::Name, 128).not_null())
                    .col(ColumnDef::new(Customer::Email).string_len(255).null())
                    .col(ColumnDef::new(Customer::Phone).string_len(32).null())
                    .col(timestamp_with_time_zone(Customer::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Customer::UpdatedAt).not_null())
                    .col(uuid(Customer::CreatedBy).not_null())
                    .col(uuid(Customer::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(Customer::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(Customer::Version).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_tenant")
                            .from(Customer::Table, Customer::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Customer::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Customer {
    Table,
    Id,
    TenantId,
    Name,
    Email,
    Phone,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    DeletedAt,
    Version,
}

#[derive(DeriveIden)]
enum Tenant { Table, Id }
