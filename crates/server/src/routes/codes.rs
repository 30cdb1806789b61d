//! Shared code tables: `/api/code-groups` and `/api/codes`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use common::envelope::Envelope;
use models::{code, code_group};
use service::code_service::{
    self, CodeFilter, CreateCode, CreateCodeGroup, UpdateCode, UpdateCodeGroup,
};
use service::pagination::Paged;

use crate::auth::{AppState, CurrentUser};
use crate::errors::ApiError;
use crate::routes::pagination;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/code-groups", get(list_groups).post(create_group))
        .route(
            "/api/code-groups/:id",
            get(get_group).put(update_group).delete(remove_group),
        )
        .route("/api/codes", get(list_codes).post(create_code))
        .route("/api/codes/:id", get(get_code).put(update_code).delete(remove_code))
}

#[derive(Debug, Default, Deserialize)]
struct GroupListQuery {
    page: Option<u32>,
    #[serde(alias = "page_size")]
    per_page: Option<u32>,
    q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CodeListQuery {
    page: Option<u32>,
    #[serde(alias = "page_size")]
    per_page: Option<u32>,
    group_id: Option<Uuid>,
    q: Option<String>,
}

async fn create_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreateCodeGroup>,
) -> Result<(StatusCode, Json<Envelope<code_group::Model>>), ApiError> {
    let created = code_service::create_code_group(&state.db, input, user.id).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn list_groups(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<GroupListQuery>,
) -> Result<Json<Envelope<Paged<code_group::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let page = code_service::list_code_groups(&state.db, query.q, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn get_group(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<code_group::Model>>, ApiError> {
    let found = code_service::get_code_group(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCodeGroup>,
) -> Result<Json<Envelope<code_group::Model>>, ApiError> {
    let updated = code_service::update_code_group(&state.db, id, input, user.id).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    code_service::delete_code_group(&state.db, id, user.id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}

async fn create_code(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreateCode>,
) -> Result<(StatusCode, Json<Envelope<code::Model>>), ApiError> {
    let created = code_service::create_code(&state.db, input, user.id).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn list_codes(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<CodeListQuery>,
) -> Result<Json<Envelope<Paged<code::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let filter = CodeFilter { group_id: query.group_id, q: query.q };
    let page = code_service::list_codes(&state.db, filter, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn get_code(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<code::Model>>, ApiError> {
    let found = code_service::get_code(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update_code(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCode>,
) -> Result<Json<Envelope<code::Model>>, ApiError> {
    let updated = code_service::update_code(&state.db, id, input, user.id).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove_code(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    code_service::delete_code(&state.db, id, user.id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}
