//! Create the approval tables: `workflow`, `workflow_step`, `workflow_task`.
//! Tasks reference both a workflow and one of its steps; the membership
//! check lives in the service layer.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Workflow::Table)
                    .if_not_exists()
                    .col(uuid(Workflow::Id).primary_key())
                    .col(string_len(Workflow::Name, 128).not_null())
                    .col(ColumnDef::new(Workflow::Description).text().null())
                    .col(timestamp_with_time_zone(Workflow::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Workflow::UpdatedAt).not_null())
                    .col(uuid(Workflow::CreatedBy).not_null())
                    .col(uuid(Workflow::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(Workflow::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(Workflow::Version).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkflowStep::Table)
                    .if_not_exists()
                    .col(uuid(WorkflowStep::Id).primary_key())
                    .col(uuid(WorkflowStep::WorkflowId).not_null())
                    .col(integer(WorkflowStep::Seq).not_null())
                    .col(string_len(WorkflowStep::Name, 128).not_null())
                    .col(timestamp_with_time_zone(WorkflowStep::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(WorkflowStep::UpdatedAt).not_null())
                    .col(uuid(WorkflowStep::CreatedBy).not_null())
                    .col(uuid(WorkflowStep::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(WorkflowStep::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(WorkflowStep::Version).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workflow_step_workflow")
                            .from(WorkflowStep::Table, WorkflowStep::WorkflowId)
                            .to(Workflow::Table, Workflow::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkflowTask::Table)
                    .if_not_exists()
                    .col(uuid(WorkflowTask::Id).primary_key())
                    .col(uuid(WorkflowTask::WorkflowId).not_null())
                    .col(uuid(WorkflowTask::StepId).not_null())
                    .col(string_len(WorkflowTask::Subject, 255).not_null())
                    .col(string_len(WorkflowTask::Status, 16).not_null())
                    .col(ColumnDef::new(WorkflowTask::Assignee).uuid().null())
                    .col(timestamp_with_time_zone(WorkflowTask::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(WorkflowTask::UpdatedAt).not_null())
                    .col(uuid(WorkflowTask::CreatedBy).not_null())
                    .col(uuid(WorkflowTask::UpdatedBy).not_null())
                    .col(
                        ColumnDef::new(WorkflowTask::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(integer(WorkflowTask::Version).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workflow_task_workflow")
                            .from(WorkflowTask::Table, WorkflowTask::WorkflowId)
                            .to(Workflow::Table, Workflow::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workflow_task_step")
                            .from(WorkflowTask::Table, WorkflowTask::StepId)
                            .to(WorkflowStep::Table, WorkflowStep::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkflowTask::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkflowStep::Table).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(Workflow::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Workflow {
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

#[derive(DeriveIden)]
enum WorkflowStep {
    Table,
    Id,
    WorkflowId,
    Seq,
    Name,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    DeletedAt,
    Version,
}

#[derive(DeriveIden)]
enum WorkflowTask {
    Table,
    Id,
    WorkflowId,
    StepId,
    Subject,
    Status,
    Assignee,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
    DeletedAt,
    Version,
}
