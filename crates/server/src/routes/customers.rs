use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use common::envelope::Envelope;
use models::customer;
use service::customer_service::{self, CreateCustomer, CustomerFilter, UpdateCustomer};
use service::pagination::Paged;

use crate::auth::{AppState, CurrentUser};
use crate::errors::ApiError;
use crate::routes::pagination;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route("/api/customers/:id", get(get_one).put(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<u32>,
    #[serde(alias = "page_size")]
    per_page: Option<u32>,
    tenant_id: Option<Uuid>,
    q: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreateCustomer>,
) -> Result<(StatusCode, Json<Envelope<customer::Model>>), ApiError> {
    let created = customer_service::create_customer(&state.db, input, user.id).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<customer::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let filter = CustomerFilter { tenant_id: query.tenant_id, q: query.q };
    let page = customer_service::list_customers(&state.db, filter, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<customer::Model>>, ApiError> {
    let found = customer_service::get_customer(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCustomer>,
) -> Result<Json<Envelope<customer::Model>>, ApiError> {
    let updated = customer_service::update_customer(&state.db, id, input, user.id).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    customer_service::delete_customer(&state.db, id, user.id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}
