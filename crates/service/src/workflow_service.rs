//! Approval workflows: a workflow owns ordered steps, and tasks are
//! instances pinned to one step. A task's step must belong to the same
//! workflow the task references.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    pagination::{Paged, Pagination},
};
use models::workflow_task::{self, TaskStatus};
use models::{workflow, workflow_step};

// ---------------------------------------------------------------------------
// Workflows
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct CreateWorkflow {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateWorkflow {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<i32>,
}

pub async fn create_workflow(
    db: &DatabaseConnection,
    input: CreateWorkflow,
    actor: Uuid,
) -> Result<workflow::Model, ServiceError> {
    workflow::validate_name(&input.name)?;
    let now = Utc::now();
    let am = workflow::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        description: Set(input.description),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    am.insert(db).await.map_err(ServiceError::db)
}

pub async fn get_workflow(db: &DatabaseConnection, id: Uuid) -> Result<workflow::Model, ServiceError> {
    workflow::Entity::find_by_id(id)
        .filter(workflow::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("workflow"))
}

pub async fn list_workflows(
    db: &DatabaseConnection,
    q: Option<String>,
    opts: Pagination,
) -> Result<Paged<workflow::Model>, ServiceError> {
    let mut query = workflow::Entity::find().filter(workflow::Column::DeletedAt.is_null());
    if let Some(q) = q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(workflow::Column::Name.contains(q));
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query.order_by_asc(workflow::Column::Name).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_workflow(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateWorkflow,
    actor: Uuid,
) -> Result<workflow::Model, ServiceError> {
    let found = get_workflow(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    let current_version = found.version;
    let mut am: workflow::ActiveModel = found.into();
    if let Some(name) = input.name {
        workflow::validate_name(&name)?;
        am.name = Set(name);
    }
    if let Some(description) = input.description {
        am.description = Set(Some(description));
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = workflow::Entity::update_many()
            .set(am)
            .filter(workflow::Column::Id.eq(id))
            .filter(workflow::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_workflow(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_workflow(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_workflow(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_workflow(db, id).await?;
    let open_tasks = workflow_task::Entity::find()
        .filter(workflow_task::Column::WorkflowId.eq(id))
        .filter(workflow_task::Column::DeletedAt.is_null())
        .filter(workflow_task::Column::Status.is_in([TaskStatus::Open, TaskStatus::InProgress]))
        .count(db)
        .await
        .map_err(ServiceError::db)?;
    if open_tasks > 0 {
        return Err(ServiceError::Validation("workflow has open tasks".into()));
    }
    let mut am: workflow::ActiveModel = found.into();
    let now = Utc::now();
    am.deleted_at = Set(Some(now.into()));
    am.updated_at = Set(now.into());
    am.updated_by = Set(actor);
    am.update(db).await.map_err(ServiceError::db)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct CreateWorkflowStep {
    pub workflow_id: Uuid,
    pub seq: i32,
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateWorkflowStep {
    pub seq: Option<i32>,
    pub name: Option<String>,
    pub version: Option<i32>,
}

pub async fn create_workflow_step(
    db: &DatabaseConnection,
    input: CreateWorkflowStep,
    actor: Uuid,
) -> Result<workflow_step::Model, ServiceError> {
    workflow_step::validate_name(&input.name)?;
    workflow_step::validate_seq(input.seq)?;
    get_workflow(db, input.workflow_id).await.map_err(|e| match e {
        ServiceError::NotFound(_) => ServiceError::Validation("workflow does not exist".into()),
        other => other,
    })?;
    let dup = workflow_step::Entity::find()
        .filter(workflow_step::Column::WorkflowId.eq(input.workflow_id))
        .filter(workflow_step::Column::Seq.eq(input.seq))
        .filter(workflow_step::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if dup.is_some() {
        return Err(ServiceError::duplicate("workflow_step", "seq"));
    }

    let now = Utc::now();
    let am = workflow_step::ActiveModel {
        id: Set(Uuid::new_v4()),
        workflow_id: Set(input.workflow_id),
        seq: Set(input.seq),
        name: Set(input.name),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    am.insert(db).await.map_err(ServiceError::db)
}

pub async fn get_workflow_step(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<workflow_step::Model, ServiceError> {
    workflow_step::Entity::find_by_id(id)
        .filter(workflow_step::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("workflow_step"))
}

pub async fn list_workflow_steps(
    db: &DatabaseConnection,
    workflow_id: Uuid,
    opts: Pagination,
) -> Result<Paged<workflow_step::Model>, ServiceError> {
    let query = workflow_step::Entity::find()
        .filter(workflow_step::Column::DeletedAt.is_null())
        .filter(workflow_step::Column::WorkflowId.eq(workflow_id));
    let (page_idx, per_page) = opts.normalize();
    let paginator = query.order_by_asc(workflow_step::Column::Seq).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_workflow_step(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateWorkflowStep,
    actor: Uuid,
) -> Result<workflow_step::Model, ServiceError> {
    let found = get_workflow_step(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    let current_version = found.version;
    let mut am: workflow_step::ActiveModel = found.into();
    if let Some(seq) = input.seq {
        workflow_step::validate_seq(seq)?;
        am.seq = Set(seq);
    }
    if let Some(name) = input.name {
        workflow_step::validate_name(&name)?;
        am.name = Set(name);
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = workflow_step::Entity::update_many()
            .set(am)
            .filter(workflow_step::Column::Id.eq(id))
            .filter(workflow_step::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_workflow_step(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_workflow_step(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_workflow_step(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_workflow_step(db, id).await?;
    let live_tasks = workflow_task::Entity::find()
        .filter(workflow_task::Column::StepId.eq(id))
        .filter(workflow_task::Column::DeletedAt.is_null())
        .count(db)
        .await
        .map_err(ServiceError::db)?;
    if live_tasks > 0 {
        return Err(ServiceError::Validation("workflow_step has tasks".into()));
    }
    let mut am: workflow_step::ActiveModel = found.into();
    let now = Utc::now();
    am.deleted_at = Set(Some(now.into()));
    am.updated_at = Set(now.into());
    am.updated_by = Set(actor);
    am.update(db).await.map_err(ServiceError::db)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct CreateWorkflowTask {
    pub workflow_id: Uuid,
    pub step_id: Uuid,
    pub subject: String,
    #[serde(default = "default_task_status")]
    pub status: TaskStatus,
    pub assignee: Option<Uuid>,
}

fn default_task_status() -> TaskStatus {
    TaskStatus::Open
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateWorkflowTask {
    pub step_id: Option<Uuid>,
    pub subject: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee: Option<Uuid>,
    pub version: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WorkflowTaskFilter {
    pub workflow_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub assignee: Option<Uuid>,
}

async fn require_step_in_workflow(
    db: &DatabaseConnection,
    step_id: Uuid,
    workflow_id: Uuid,
) -> Result<(), ServiceError> {
    let step = get_workflow_step(db, step_id).await.map_err(|e| match e {
        ServiceError::NotFound(_) => ServiceError::Validation("workflow_step does not exist".into()),
        other => other,
    })?;
    if step.workflow_id != workflow_id {
        return Err(ServiceError::Validation(
            "workflow_step belongs to a different workflow".into(),
        ));
    }
    Ok(())
}

pub async fn create_workflow_task(
    db: &DatabaseConnection,
    input: CreateWorkflowTask,
    actor: Uuid,
) -> Result<workflow_task::Model, ServiceError> {
    workflow_task::validate_subject(&input.subject)?;
    get_workflow(db, input.workflow_id).await.map_err(|e| match e {
        ServiceError::NotFound(_) => ServiceError::Validation("workflow does not exist".into()),
        other => other,
    })?;
    require_step_in_workflow(db, input.step_id, input.workflow_id).await?;

    let now = Utc::now();
    let am = workflow_task::ActiveModel {
        id: Set(Uuid::new_v4()),
        workflow_id: Set(input.workflow_id),
        step_id: Set(input.step_id),
        subject: Set(input.subject),
        status: Set(input.status),
        assignee: Set(input.assignee),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    am.insert(db).await.map_err(ServiceError::db)
}

pub async fn get_workflow_task(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<workflow_task::Model, ServiceError> {
    workflow_task::Entity::find_by_id(id)
        .filter(workflow_task::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("workflow_task"))
}

pub async fn list_workflow_tasks(
    db: &DatabaseConnection,
    filter: WorkflowTaskFilter,
    opts: Pagination,
) -> Result<Paged<workflow_task::Model>, ServiceError> {
    let mut query = workflow_task::Entity::find().filter(workflow_task::Column::DeletedAt.is_null());
    if let Some(workflow_id) = filter.workflow_id {
        query = query.filter(workflow_task::Column::WorkflowId.eq(workflow_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(workflow_task::Column::Status.eq(status));
    }
    if let Some(assignee) = filter.assignee {
        query = query.filter(workflow_task::Column::Assignee.eq(assignee));
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query
        .order_by_desc(workflow_task::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_workflow_task(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateWorkflowTask,
    actor: Uuid,
) -> Result<workflow_task::Model, ServiceError> {
    let found = get_workflow_task(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    // Moving the task to another step keeps it inside the same workflow.
    if let Some(step_id) = input.step_id {
        require_step_in_workflow(db, step_id, found.workflow_id).await?;
    }
    let current_version = found.version;
    let mut am: workflow_task::ActiveModel = found.into();
    if let Some(step_id) = input.step_id {
        am.step_id = Set(step_id);
    }
    if let Some(subject) = input.subject {
        workflow_task::validate_subject(&subject)?;
        am.subject = Set(subject);
    }
    if let Some(status) = input.status {
        am.status = Set(status);
    }
    if let Some(assignee) = input.assignee {
        am.assignee = Set(Some(assignee));
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = workflow_task::Entity::update_many()
            .set(am)
            .filter(workflow_task::Column::Id.eq(id))
            .filter(workflow_task::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_workflow_task(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_workflow_task(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_workflow_task(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_workflow_task(db, id).await?;
    let mut am: workflow_task::ActiveModel = found.into();
    let now = Utc::now();
    am.deleted_at = Set(Some(now.into()));
    am.updated_at = Set(now.into());
    am.updated_by = Set(actor);
    am.update(db).await.map_err(ServiceError::db)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn task_step_must_match_workflow() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };
        let actor = Uuid::new_v4();

        let wf_a = create_workflow(
            &db,
            CreateWorkflow { name: format!("approval_a_{}", Uuid::new_v4()), description: None },
            actor,
        )
        .await?;
        let wf_b = create_workflow(
            &db,
            CreateWorkflow { name: format!("approval_b_{}", Uuid::new_v4()), description: None },
            actor,
        )
        .await?;
        let step_a = create_workflow_step(
            &db,
            CreateWorkflowStep { workflow_id: wf_a.id, seq: 1, name: "Manager review".into() },
            actor,
        )
        .await?;
        let step_b = create_workflow_step(
            &db,
            CreateWorkflowStep { workflow_id: wf_b.id, seq: 1, name: "Finance review".into() },
            actor,
        )
        .await?;

        // cross-workflow step is rejected
        let cross = create_workflow_task(
            &db,
            CreateWorkflowTask {
                workflow_id: wf_a.id,
                step_id: step_b.id,
                subject: "PO approval".into(),
                status: TaskStatus::Open,
                assignee: None,
            },
            actor,
        )
        .await;
        assert!(matches!(cross, Err(ServiceError::Validation(_))));

        let task = create_workflow_task(
            &db,
            CreateWorkflowTask {
                workflow_id: wf_a.id,
                step_id: step_a.id,
                subject: "PO approval".into(),
                status: TaskStatus::Open,
                assignee: Some(actor),
            },
            actor,
        )
        .await?;

        // workflow with an open task refuses delete
        let blocked = delete_workflow(&db, wf_a.id, actor).await;
        assert!(matches!(blocked, Err(ServiceError::Validation(_))));

        // moving the task to a foreign step is rejected too
        let bad_move = update_workflow_task(
            &db,
            task.id,
            UpdateWorkflowTask { step_id: Some(step_b.id), ..Default::default() },
            actor,
        )
        .await;
        assert!(matches!(bad_move, Err(ServiceError::Validation(_))));

        let done = update_workflow_task(
            &db,
            task.id,
            UpdateWorkflowTask { status: Some(TaskStatus::Done), ..Default::default() },
            actor,
        )
        .await?;
        assert_eq!(done.status, TaskStatus::Done);

        // once no task is open the workflow can go away
        delete_workflow(&db, wf_a.id, actor).await?;
        delete_workflow(&db, wf_b.id, actor).await?;
        Ok(())
    }
}
