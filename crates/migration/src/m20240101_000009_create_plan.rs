//! Create `plan` table (billing plan catalog, not tenant-scoped).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Plan::Table)
                    .if_not_exists()
                    .col(uuid(Plan::Id).primary_key())
                    .col(string_len(Plan::Code, 64).not_null())
                    .col(string_len(Plan::Name, 128).not_null())
                    .col(ColumnDef::new(Plan::Description).text().null())
                    .col(string_len(Plan::Status, 16).not_null())
                    .col(date(Plan::StartsOn).not_null())
                    .col(ColumnDef::new(Plan::EndsOn).date().null())
                    .col(timestamp_with_time_zone(Plan::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Plan::UpdatedAt).not_null())
                    .col(uuid(Plan::CreatedBy).not_null())
                    .col(uuid(Plan::UpdatedBy).not_null())
                    .col(ColumnDef::new(Plan::DeletedAt).timestamp_with_time_zone().null())
                    .col(integer(Plan::Version).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Plan::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Plan {
    Table,
    Id,
    Code,
    Name,
    Description,
    Status,
    StartsOn,
    EndsOn,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    DeletedAt,
    Version,
}
