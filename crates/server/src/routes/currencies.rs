use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use common::envelope::Envelope;
use models::currency;
use service::currency_service::{self, CreateCurrency, CurrencyFilter, UpdateCurrency};
use service::pagination::Paged;

use crate::auth::{AppState, CurrentUser};
use crate::errors::ApiError;
use crate::routes::pagination;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/currencies", get(list).post(create))
        .route("/api/currencies/:id", get(get_one).put(update).delete(remove))
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
    user: CurrentUser,
    Json(input): Json<CreateCurrency>,
) -> Result<(StatusCode, Json<Envelope<currency::Model>>), ApiError> {
    let created = currency_service::create_currency(&state.db, input, user.id).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<currency::Model>>>, ApiError> {
    let opts = pagination(query.page, query.per_page);
    let filter = CurrencyFilter { q: query.q };
    let page = currency_service::list_currencies(&state.db, filter, opts).await?;
    Ok(Json(Envelope::ok(page)))
}

async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<currency::Model>>, ApiError> {
    let found = currency_service::get_currency(&state.db, id).await?;
    Ok(Json(Envelope::ok(found)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCurrency>,
) -> Result<Json<Envelope<currency::Model>>, ApiError> {
    let updated = currency_service::update_currency(&state.db, id, input, user.id).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    currency_service::delete_currency(&state.db, id, user.id).await?;
    Ok(Json(Envelope::ok(serde_json::Value::Null)))
}
