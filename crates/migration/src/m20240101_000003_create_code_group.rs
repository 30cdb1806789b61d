//! Create `code_group` table (master-data code namespaces).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CodeGroup::Table)
                    .if_not_exists()
                    .col(uuid(CodeGroup::Id).primary_key())
                    .col(string_len(CodeGroup::Name, 64).not_null())
                    .col(ColumnDef::new(CodeGroup::Description).text().null())
                    .col(timestamp_with_time_zone(CodeGroup::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(CodeGroup::UpdatedAt).not_null())
                    .col(uuid(CodeGroup::CreatedBy).not_null())
                    .col(uuid(CodeGroup::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(CodeGroup::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(CodeGroup::Version).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CodeGroup::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CodeGroup {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    DeletedAt,
    Version,
}
