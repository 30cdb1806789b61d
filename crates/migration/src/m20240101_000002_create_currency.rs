//! Create `currency` table. Codes are unique among live rows (enforced at
//! the service layer so soft-deleted codes can be re-created).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Currency::Table)
                    .if_not_exists()
                    .col(uuid(Currency::Id).primary_key())
                    .col(string_len(Currency::Code, 3).not_null())
                    .col(string_len(Currency::Name, 64).not_null())
                    .col(string_len(Currency::Symbol, 8).not_null())
                    .col(small_integer(Currency::MinorUnits).not_null())
                    .col(timestamp_with_time_zone(Currency::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Currency::UpdatedAt).not_null())
                    .col(uuid(Currency::CreatedBy).not_null())
                    .col(uuid(Currency::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(Currency::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(Currency::Version).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Currency::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Currency {
    Table,
    Id,
    Code,
    Name,
    Symbol,
    MinorUnits,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    DeletedAt,
    Version,
}
