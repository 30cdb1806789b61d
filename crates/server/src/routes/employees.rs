use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use common::envelope::Envelope;
use models::employee;
use service::employee_service::{self, CreateEmployee, EmployeeFilter, UpdateEmployee};
use service::pagination::Paged;

use crate::auth::{AppState, CurrentUser};
use crate::errors::ApiError;
use crate::routes::pagination;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/employees", get(list).post(create))
        .route("/api/employees/:id", get(get_one).put(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<u32>,
    #[serde(alias = "page_size")]
    per_page: Option<u32>,
    tenant_id: Option<Uuid>,
    department: Option<String>,
    q: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreateEmployee>,
) -> Result<(StatusCode, Json<Envelope<employee::Model>>), ApiError> {
    let created = employee_service::create_employee(&state.db, input, user.id).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<employee::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let filter = EmployeeFilter {
        tenant_id: query.tenant_id,
        department: query.department,
        q: query.q,
    };
    let page = employee_service::list_employees(&state.db, filter, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<employee::Model>>, ApiError> {
    let found = employee_service::get_employee(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateEmployee>,
) -> Result<Json<Envelope<employee::Model>>, ApiError> {
    let updated = employee_service::update_employee(&state.db, id, input, user.id).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    employee_service::delete_employee(&state.db, id, user.id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}
