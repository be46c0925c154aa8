//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  /health                                      → OK / 503           │
//! │                                                                         │
//! │  Admin                                                                  │
//! │  POST /admin/sync                  {sync}          → AdminResult        │
//! │  POST /admin/sync-error            {sync, msg}     → 204                │
//! │  POST /admin/customers/sync        {ids}           → AdminResult        │
//! │  POST /admin/orders/sync           {ids}           → AdminResult        │
//! │  POST /admin/price-lists/assign    {assignments}   → {assigned}         │
//! │  GET  /admin/price-lists                           → [{code, name}]     │
//! │  GET  /admin/status                                → [{sync_name, ..}]  │
//! │                                                                         │
//! │  Hooks                                                                  │
//! │  POST /hooks/order-processed/{id}                  → AfterOrderReport   │
//! │  POST /hooks/user-registered/{id}                  → CustomerOutcome    │
//! │                                                                         │
//! │  Storefront (user id 0 = anonymous)                                     │
//! │  GET  /storefront/{user_id}/catalog                                     │
//! │  GET  /storefront/{user_id}/price/{sku}?price=12.50                     │
//! │  GET  /storefront/{user_id}/price-range/{product_id}                    │
//! │  GET  /storefront/{user_id}/currency                                    │
//! │  GET  /storefront/{user_id}/variation-visible/{sku}                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use ledgerlink_core::pricing::{CatalogFilter, PriceListSummary};
use ledgerlink_core::Money;
use ledgerlink_sync::admin::{self, AdminResult, PriceListAssignment, SyncStatus};
use ledgerlink_sync::{AfterOrderReport, CustomerOutcome, PriceResolver, SyncEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;

/// Shared route state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SyncEngine>,
    pub resolver: PriceResolver,
}

impl AppState {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        let resolver = PriceResolver::for_engine(&engine);
        AppState { engine, resolver }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/admin/sync", post(admin_sync))
        .route("/admin/sync-error", post(admin_sync_error))
        .route("/admin/customers/sync", post(admin_sync_customers))
        .route("/admin/orders/sync", post(admin_sync_orders))
        .route("/admin/price-lists/assign", post(admin_assign_price_lists))
        .route("/admin/price-lists", get(admin_price_lists))
        .route("/admin/status", get(admin_status))
        .route("/hooks/order-processed/{id}", post(order_processed))
        .route("/hooks/user-registered/{id}", post(user_registered))
        .route("/storefront/{user_id}/catalog", get(catalog_filter))
        .route("/storefront/{user_id}/price/{sku}", get(price))
        .route("/storefront/{user_id}/price-range/{product_id}", get(price_range))
        .route("/storefront/{user_id}/currency", get(currency))
        .route("/storefront/{user_id}/variation-visible/{sku}", get(variation_visible))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.engine.database().is_reachable().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "DATABASE UNAVAILABLE")
    }
}

// =============================================================================
// Admin
// =============================================================================

#[derive(Debug, Deserialize)]
struct SyncRequest {
    sync: String,
}

async fn admin_sync(State(state): State<AppState>, Json(req): Json<SyncRequest>) -> Json<AdminResult> {
    Json(admin::dispatch(&state.engine, &req.sync).await)
}

#[derive(Debug, Deserialize)]
struct SyncErrorRequest {
    sync: String,
    msg: String,
}

async fn admin_sync_error(
    State(state): State<AppState>,
    Json(req): Json<SyncErrorRequest>,
) -> Result<StatusCode, ApiError> {
    admin::report_admin_error(&state.engine, &req.sync, &req.msg).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct IdsRequest {
    ids: Vec<i64>,
}

async fn admin_sync_customers(
    State(state): State<AppState>,
    Json(req): Json<IdsRequest>,
) -> Json<AdminResult> {
    Json(admin::sync_customers(&state.engine, &req.ids).await)
}

async fn admin_sync_orders(
    State(state): State<AppState>,
    Json(req): Json<IdsRequest>,
) -> Json<AdminResult> {
    Json(admin::sync_orders(&state.engine, &req.ids).await)
}

#[derive(Debug, Deserialize)]
struct AssignRequest {
    assignments: Vec<PriceListAssignment>,
}

#[derive(Debug, Serialize)]
struct AssignResponse {
    assigned: usize,
}

async fn admin_assign_price_lists(
    State(state): State<AppState>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<AssignResponse>, ApiError> {
    let assigned = admin::assign_price_lists(&state.engine, &req.assignments).await?;
    Ok(Json(AssignResponse { assigned }))
}

async fn admin_price_lists(
    State(state): State<AppState>,
) -> Result<Json<Vec<PriceListSummary>>, ApiError> {
    Ok(Json(admin::list_price_lists(&state.engine).await?))
}

async fn admin_status(State(state): State<AppState>) -> Result<Json<Vec<SyncStatus>>, ApiError> {
    Ok(Json(admin::status(&state.engine).await?))
}

// =============================================================================
// Hooks
// =============================================================================

async fn order_processed(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AfterOrderReport>, ApiError> {
    Ok(Json(state.engine.on_order_processed(id).await?))
}

async fn user_registered(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerOutcome>, ApiError> {
    Ok(Json(state.engine.on_user_registered(id).await?))
}

// =============================================================================
// Storefront
// =============================================================================

async fn catalog_filter(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<CatalogFilter>, ApiError> {
    Ok(Json(state.resolver.catalog_filter(user_id).await?))
}

#[derive(Debug, Deserialize)]
struct PriceQuery {
    /// The product's own price, decimal.
    price: f64,
}

#[derive(Debug, Serialize)]
struct PriceResponse {
    sku: String,
    price: String,
}

async fn price(
    State(state): State<AppState>,
    Path((user_id, sku)): Path<(i64, String)>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<PriceResponse>, ApiError> {
    let price = state
        .resolver
        .price(user_id, &sku, Money::from_decimal(query.price))
        .await?;
    Ok(Json(PriceResponse {
        sku,
        price: price.to_string(),
    }))
}

#[derive(Debug, Serialize)]
struct PriceRangeResponse {
    display: String,
}

async fn price_range(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<PriceRangeResponse>, ApiError> {
    let display = state.resolver.price_range(user_id, product_id).await?;
    Ok(Json(PriceRangeResponse { display }))
}

#[derive(Debug, Serialize)]
struct CurrencyResponse {
    currency: String,
}

async fn currency(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<CurrencyResponse>, ApiError> {
    let currency = state.resolver.currency(user_id).await?;
    Ok(Json(CurrencyResponse { currency }))
}

#[derive(Debug, Serialize)]
struct VisibilityResponse {
    visible: bool,
}

async fn variation_visible(
    State(state): State<AppState>,
    Path((user_id, sku)): Path<(i64, String)>,
) -> Result<Json<VisibilityResponse>, ApiError> {
    let visible = state.resolver.variation_visible(user_id, &sku).await?;
    Ok(Json(VisibilityResponse { visible }))
}

// =============================================================================
// Unit Tests
// =============================================================================
