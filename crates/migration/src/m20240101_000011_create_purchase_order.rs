//! Create `purchase_order` table with FK to `tenant`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PurchaseOrder::Table)
                    .if_not_exists()
                    .col(uuid(PurchaseOrder::Id).primary_key())
                    .col(uuid(PurchaseOrder::TenantId).not_null())
                    .col(string_len(PurchaseOrder::Number, 32).not_null())
                    .col(string_len(PurchaseOrder::SupplierName, 128).not_null())
                    .col(string_len(PurchaseOrder::Status, 16).not_null())
                    .col(decimal_len(PurchaseOrder::TotalAmount, 18, 2).not_null())
                    .col(date(PurchaseOrder::OrderedOn).not_null())
                    .col(timestamp_with_time_zone(PurchaseOrder::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(PurchaseOrder::UpdatedAt).not_null())
                    .col(uuid(PurchaseOrder::CreatedBy).not_null())
                    .col(uuid(PurchaseOrder::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(PurchaseOrder::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(PurchaseOrder::Version).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_order_tenant")
                            .from(PurchaseOrder::Table, PurchaseOrder::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PurchaseOrder::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PurchaseOrder {
    Table,
    Id,
    TenantId,
    Number,
    SupplierName,
    Status,
    TotalAmount,
    OrderedOn,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    DeletedAt,
    Version,
}

#[derive(DeriveIden)]
enum Tenant { Table, Id }
