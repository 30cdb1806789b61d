use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors::ModelError, workflow, workflow_step};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workflow_task")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub step_id: Uuid,
    pub subject: String,
    pub status: TaskStatus,
    pub assignee: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub version: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "DONE")]
    Done,
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Workflow,
    Step,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Workflow => Entity::belongs_to(workflow::Entity)
                .from(Column::WorkflowId)
                .to(workflow::Column::Id)
                .into(),
            Relation::Step => Entity::belongs_to(workflow_step::Entity)
                .from(Column::StepId)
                .to(workflow_step::Column::Id)
                .into(),
        }
    }
}

impl Related<workflow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workflow.def()
    }
}

impl Related<workflow_step::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Step.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_subject(subject: &str) -> Result<(), ModelError> {
    if subject.trim().is_empty() {
        return Err(ModelError::Validation("subject required".into()));
    }
    if subject.len() > 255 {
        return Err(ModelError::Validation("subject too long (max 255)".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_serde() {
        let v = serde_json::to_value(TaskStatus::InProgress).unwrap();
        assert_eq!(v, "IN_PROGRESS");
        let s: TaskStatus = serde_json::from_value(serde_json::json!("DONE")).unwrap();
        assert_eq!(s, TaskStatus::Done);
    }
}
