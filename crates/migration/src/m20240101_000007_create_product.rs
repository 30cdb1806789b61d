//! Create `product` table with FK to `tenant`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(uuid(Product::Id).primary_key())
                    .col(uuid(Product::TenantId).not_null())
                    .col(string_len(Product::Sku, 64).not_null())
                    .col(string_len(Product::Name, 128).not_null())
                    .col(ColumnDef::new(Product::Description).text().null())
                    .col(decimal_len(Product::UnitPrice, 18, 2).not_null())
                    .col(string_len(Product::Uom, 16).not_null())
                    .col(timestamp_with_time_zone(Product::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Product::UpdatedAt).not_null())
                    .col(uuid(Product::CreatedBy).not_null())
                    .col(uuid(Product::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(Product::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(Product::Version).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_tenant")
                            .from(Product::Table, Product::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product {
    Table,
    Id,
    TenantId,
    Sku,
    Name,
    Description,
    UnitPrice,
    Uom,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    DeletedAt,
    Version,
}

#[derive(DeriveIden)]
enum Tenant { Table, Id }
