//! Create `invoice` table with FKs to `tenant` and `customer`.
//! Amount columns must satisfy total = base + usage - discount + tax,
//! validated at the service layer.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoice::Table)
                    .if_not_exists()
                    .col(uuid(Invoice::Id).primary_key())
                    .col(uuid(Invoice::TenantId).not_null())
                    .col(uuid(Invoice::CustomerId).not_null())
                    .col(string_len(Invoice::Number, 32).not_null())
                    .col(string_len(Invoice::Status, 16).not_null())
                    .col(string_len(Invoice::CurrencyCode, 3).not_null())
                    .col(decimal_len(Invoice::BaseAmount, 18, 2).not_null())
                    .col(decimal_len(Invoice::UsageAmount, 18, 2).not_null())
                    .col(decimal_len(Invoice::DiscountAmount, 18, 2).not_null())
                    .col(decimal_len(Invoice::TaxAmount, 18, 2).not_null())
                    .col(decimal_len(Invoice::TotalAmount, 18, 2).not_null())
                    .col(date(Invoice::IssuedOn).not_null())
                    .col(date(Invoice::DueOn).not_null())
                    .col(ColumnDef::new(Invoice::Notes).text().null())
                    .col(timestamp_with_time_zone(Invoice::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Invoice::UpdatedAt).not_null())
                    .col(uuid(Invoice::CreatedBy).not_null())
                    .col(uuid(Invoice::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(Invoice::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(Invoice::Version).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_tenant")
                            .from(Invoice::Table, Invoice::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_customer")
                            .from(Invoice::Table, Invoice::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Invoice::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Invoice {
    Table,
    Id,
    TenantId,
    CustomerId,
    Number,
    Status,
    CurrencyCode,
    BaseAmount,
    UsageAmount,
    DiscountAmount,
    TaxAmount,
    TotalAmount,
    IssuedOn,
    DueOn,
    Notes,
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
