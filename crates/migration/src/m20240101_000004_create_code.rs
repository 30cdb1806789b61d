//! Create `code` table with FK to `code_group`. Rows flagged `is_system`
//! refuse deletion at the service layer.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Code::Table)
                    .if_not_exists()
                    .col(uuid(Code::Id).primary_key())
                    .col(uuid(Code::GroupId).not_null())
                    .col(string_len(Code::Code, 64).not_null())
                    .col(string_len(Code::Label, 128).not_null())
                    .col(boolean(Code::IsSystem).not_null())
                    .col(integer(Code::SortOrder).not_null())
                    .col(timestamp_with_time_zone(Code::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Code::UpdatedAt).not_null())
                    .col(uuid(Code::CreatedBy).not_null())
                    .col(uuid(Code::UpdatedBy).not_null())
                    .col(ColumnDef::new(Code::DeletedAt).timestamp_with_time_zone().null())
                    .col(integer(Code::Version).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_code_code_group")
                            .from(Code::Table, Code::GroupId)
                            .to(CodeGroup::Table, CodeGroup::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Code::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Code {
    Table,
    Id,
    GroupId,
    Code,
    Label,
    IsSystem,
    SortOrder,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    DeletedAt,
    Version,
}

#[derive(DeriveIden)]
enum CodeGroup { Table, Id }
