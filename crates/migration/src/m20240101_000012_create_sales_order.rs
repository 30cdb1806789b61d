//! Create `sales_order` table with FKs to `tenant` and `customer`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SalesOrder::Table)
                    .if_not_exists()
                    .col(uuid(SalesOrder::Id).primary_key())
                    .col(uuid(SalesOrder::TenantId).not_null())
                    .col(uuid(SalesOrder::CustomerId).not_null())
                    .col(string_len(SalesOrder::Number, 32).not_null())
                    .col(string_len(SalesOrder::Status, 16).not_null())
                    .col(decimal_len(SalesOrder::TotalAmount, 18, 2).not_null())
                    .col(date(SalesOrder::OrderedOn).not_null())
                    .col(timestamp_with_time_zone(SalesOrder::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(SalesOrder::UpdatedAt).not_null())
                    .col(uuid(SalesOrder::CreatedBy).not_null())
                    .col(uuid(SalesOrder::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(SalesOrder::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(SalesOrder::Version).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_order_tenant")
                            .from(SalesOrder::Table, SalesOrder::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_order_customer")
                            .from(SalesOrder::Table, SalesOrder::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SalesOrder::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SalesOrder {
    Table,
    Id,
    TenantId,
    CustomerId,
    Number,
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

#[derive(DeriveIden)]
enum Customer { Table, Id }
