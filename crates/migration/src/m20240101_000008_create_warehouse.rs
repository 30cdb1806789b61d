//! Create `warehouse` table with FK to `tenant`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Warehouse::Table)
                    .if_not_exists()
                    .col(uuid(Warehouse::Id).primary_key())
                    .col(uuid(Warehouse::TenantId).not_null())
                    .col(string_len(Warehouse::Code, 32).not_null())
                    .col(string_len(Warehouse::Name, 128).not_null())
                    .col(ColumnDef::new(Warehouse::Address).text().null())
                    .col(timestamp_with_time_zone(Warehouse::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Warehouse::UpdatedAt).not_null())
                    .col(uuid(Warehouse::CreatedBy).not_null())
                    .col(uuid(Warehouse::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(Warehouse::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(Warehouse::Version).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_warehouse_tenant")
                            .from(Warehouse::Table, Warehouse::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Warehouse::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Warehouse {
    Table,
    Id,
    TenantId,
    Code,
    Name,
    Address,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    DeletedAt,
    Version,
}

#[derive(DeriveIden)]
enum Tenant { Table, Id }
