use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use common::envelope::Envelope;
use models::invoice::{self, InvoiceStatus};
use service::invoice_service::{self, CreateInvoice, InvoiceFilter, UpdateInvoice};
use service::pagination::Paged;

use crate::auth::{AppState, CurrentUser};
use crate::errors::ApiError;
use crate::routes::pagination;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/invoices", get(list).post(create))
        .route("/api/invoices/:id", get(get_one).put(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<u32>,
    #[serde(alias = "page_size")]
    per_page: Option<u32>,
    tenant_id: Option<Uuid>,
    customer_id: Option<Uuid>,
    status: Option<InvoiceStatus>,
    issued_from: Option<chrono::NaiveDate>,
    issued_to: Option<chrono::NaiveDate>,
    q: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreateInvoice>,
) -> Result<(StatusCode, Json<Envelope<invoice::Model>>), ApiError> {
    let created = invoice_service::create_invoice(&state.db, input, user.id).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<invoice::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let filter = InvoiceFilter {
        tenant_id: query.tenant_id,
        customer_id: query.customer_id,
        status: query.status,
        issued_from: query.issued_from,
        issued_to: query.issued_to,
        q: query.q,
    };
    let page = invoice_service::list_invoices(&state.db, filter, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<invoice::Model>>, ApiError> {
    let found = invoice_service::get_invoice(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateInvoice>,
) -> Result<Json<Envelope<invoice::Model>>, ApiError> {
    let updated = invoice_service::update_invoice(&state.db, id, input, user.id).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    invoice_service::delete_invoice(&state.db, id, user.id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}
