use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::pagination::Pagination;

use crate::auth::AppState;

pub mod codes;
pub mod currencies;
pub mod customers;
pub mod employees;
pub mod invoices;
pub mod plans;
pub mod products;
pub mod purchase_orders;
pub mod sales_orders;
pub mod tenants;
pub mod warehouses;
pub mod workflows;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Pagination from optional query params, falling back to defaults.
pub(crate) fn pagination(page: Option<u32>, per_page: Option<u32>) -> Pagination {
    let d = Pagination::default();
    Pagination {
        page: page.unwrap_or(d.page),
        per_page: per_page.unwrap_or(d.per_page),
    }
}

/// Build the full application router: health plus one resource router per
/// business module, all behind the shared trace and CORS layers.
pub fn build_router(cors: CorsLayer, state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(tenants::router())
        .merge(currencies::router())
        .merge(codes::router())
        .merge(customers::router())
        .merge(employees::router())
        .merge(products::router())
        .merge(warehouses::router())
        .merge(plans::router())
        .merge(invoices::router())
        .merge(purchase_orders::router())
        .merge(sales_orders::router())
        .merge(workflows::router())
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
