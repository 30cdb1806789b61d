use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use common::envelope::Envelope;
use models::tenant;
use service::pagination::Paged;
use service::tenant_service::{self, CreateTenant, UpdateTenant};

use crate::auth::{AppState, CurrentUser};
use crate::errors::ApiError;
use crate::routes::pagination;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tenants", get(list).post(create))
        .route("/api/tenants/:id", get(get_one).put(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<u32>,
    #[serde(alias = "page_size")]
    per_page: Option<u32>,
    q: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(input): Json<CreateTenant>,
) -> Result<(StatusCode, Json<Envelope<tenant::Model>>), ApiError> {
    let created = tenant_service::create_tenant(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<tenant::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let page = tenant_service::list_tenants(&state.db, query.q, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<tenant::Model>>, ApiError> {
    let found = tenant_service::get_tenant(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTenant>,
) -> Result<Json<Envelope<tenant::Model>>, ApiError> {
    let updated = tenant_service::update_tenant(&state.db, id, input).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    tenant_service::delete_tenant(&state.db, id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}
