//! Approval workflows: `/api/workflows`, nested steps, and `/api/workflow-tasks`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use common::envelope::Envelope;
use models::workflow_task::TaskStatus;
use models::{workflow, workflow_step, workflow_task};
use service::pagination::Paged;
use service::workflow_service::{
    self, CreateWorkflow, CreateWorkflowStep, CreateWorkflowTask, UpdateWorkflow,
    UpdateWorkflowStep, UpdateWorkflowTask, WorkflowTaskFilter,
};

use crate::auth::{AppState, CurrentUser};
use crate::errors::ApiError;
use crate::routes::pagination;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/workflows", get(list_workflows).post(create_workflow))
        .route(
            "/api/workflows/:id",
            get(get_workflow).put(update_workflow).delete(remove_workflow),
        )
        .route("/api/workflows/:id/steps", get(list_steps))
        .route("/api/workflow-steps", post(create_step))
        .route(
            "/api/workflow-steps/:id",
            get(get_step).put(update_step).delete(remove_step),
        )
        .route("/api/workflow-tasks", get(list_tasks).post(create_task))
        .route(
            "/api/workflow-tasks/:id",
            get(get_task).put(update_task).delete(remove_task),
        )
}

#[derive(Debug, Default, Deserialize)]
struct WorkflowListQuery {
    page: Option<u32>,
    #[serde(alias = "page_size")]
    per_page: Option<u32>,
    q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PageOnlyQuery {
    page: Option<u32>,
    #[serde(alias = "page_size")]
    per_page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct TaskListQuery {
    page: Option<u32>,
    #[serde(alias = "page_size")]
    per_page: Option<u32>,
    workflow_id: Option<Uuid>,
    status: Option<TaskStatus>,
    assignee: Option<Uuid>,
}

async fn create_workflow(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreateWorkflow>,
) -> Result<(StatusCode, Json<Envelope<workflow::Model>>), ApiError> {
    let created = workflow_service::create_workflow(&state.db, input, user.id).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn list_workflows(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<WorkflowListQuery>,
) -> Result<Json<Envelope<Paged<workflow::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let page = workflow_service::list_workflows(&state.db, query.q, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn get_workflow(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<workflow::Model>>, ApiError> {
    let found = workflow_service::get_workflow(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update_workflow(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateWorkflow>,
) -> Result<Json<Envelope<workflow::Model>>, ApiError> {
    let updated = workflow_service::update_workflow(&state.db, id, input, user.id).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove_workflow(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    workflow_service::delete_workflow(&state.db, id, user.id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}

async fn list_steps(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<PageOnlyQuery>,
) -> Result<Json<Envelope<Paged<workflow_step::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let page = workflow_service::list_workflow_steps(&state.db, id, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn create_step(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreateWorkflowStep>,
) -> Result<(StatusCode, Json<Envelope<workflow_step::Model>>), ApiError> {
    let created = workflow_service::create_workflow_step(&state.db, input, user.id).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn get_step(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<workflow_step::Model>>, ApiError> {
    let found = workflow_service::get_workflow_step(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update_step(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateWorkflowStep>,
) -> Result<Json<Envelope<workflow_step::Model>>, ApiError> {
    let updated = workflow_service::update_workflow_step(&state.db, id, input, user.id).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove_step(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    workflow_service::delete_workflow_step(&state.db, id, user.id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}

async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreateWorkflowTask>,
) -> Result<(StatusCode, Json<Envelope<workflow_task::Model>>), ApiError> {
    let created = workflow_service::create_workflow_task(&state.db, input, user.id).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn list_tasks(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Envelope<Paged<workflow_task::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let filter = WorkflowTaskFilter {
        workflow_id: query.workflow_id,
        status: query.status,
        assignee: query.assignee,
    };
    let page = workflow_service::list_workflow_tasks(&state.db, filter, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn get_task(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<workflow_task::Model>>, ApiError> {
    let found = workflow_service::get_workflow_task(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateWorkflowTask>,
) -> Result<Json<Envelope<workflow_task::Model>>, ApiError> {
    let updated = workflow_service::update_workflow_task(&state.db, id, input, user.id).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    workflow_service::delete_workflow_task(&state.db, id, user.id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}
