use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use common::envelope::Envelope;
use models::purchase_order::{self, PurchaseOrderStatus};
use service::pagination::Paged;
use service::purchase_order_service::{
    self, CreatePurchaseOrder, PurchaseOrderFilter, UpdatePurchaseOrder,
};

use crate::auth::{AppState, CurrentUser};
use crate::errors::ApiError;
use crate::routes::pagination;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/purchase-orders", get(list).post(create))
        .route("/api/purchase-orders/:id", get(get_one).put(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<u32>,
    #[serde(alias = "page_size")]
    per_page: Option<u32>,
    tenant_id: Option<Uuid>,
    status: Option<PurchaseOrderStatus>,
    q: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreatePurchaseOrder>,
) -> Result<(StatusCode, Json<Envelope<purchase_order::Model>>), ApiError> {
    let created = purchase_order_service::create_purchase_order(&state.db, input, user.id).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<purchase_order::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let filter = PurchaseOrderFilter {
        tenant_id: query.tenant_id,
        status: query.status,
        q: query.q,
    };
    let page = purchase_order_service::list_purchase_orders(&state.db, filter, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<purchase_order::Model>>, ApiError> {
    let found = purchase_order_service::get_purchase_order(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePurchaseOrder>,
) -> Result<Json<Envelope<purchase_order::Model>>, ApiError> {
    let updated =
        purchase_order_service::update_purchase_order(&state.db, id, input, user.id).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    purchase_order_service::delete_purchase_order(&state.db, id, user.id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}
