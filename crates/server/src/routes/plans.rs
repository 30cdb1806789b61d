use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use common::envelope::Envelope;
use models::plan::{self, PlanStatus};
use service::pagination::Paged;
use service::plan_service::{self, CreatePlan, PlanFilter, UpdatePlan};

use crate::auth::{AppState, CurrentUser};
use crate::errors::ApiError;
use crate::routes::pagination;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/plans", get(list).post(create))
        .route("/api/plans/:id", get(get_one).put(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<u32>,
    #[serde(alias = "page_size")]
    per_page: Option<u32>,
    status: Option<PlanStatus>,
    q: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreatePlan>,
) -> Result<(StatusCode, Json<Envelope<plan::Model>>), ApiError> {
    let created = plan_service::create_plan(&state.db, input, user.id).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<plan::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let filter = PlanFilter { status: query.status, q: query.q };
    let page = plan_service::list_plans(&state.db, filter, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<plan::Model>>, ApiError> {
    let found = plan_service::get_plan(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePlan>,
) -> Result<Json<Envelope<plan::Model>>, ApiError> {
    let updated = plan_service::update_plan(&state.db, id, input, user.id).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    plan_service::delete_plan(&state.db, id, user.id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}
