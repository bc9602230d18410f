//! # Service Catalog Routes
//!
//! Routes:
//! - POST   /v1/services — create a service
//! - GET    /v1/services — list the tenant's services
//! - GET    /v1/services/{id} — fetch a service
//! - PUT    /v1/services/{id} — update a service
//! - DELETE /v1/services/{id} — deactivate a service
//! - POST   /v1/services/{id}/quote — price a prospective request

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use atrium_catalog::{PricingTier, RequestPriority, Service, ServiceCategory};
use atrium_core::{Money, ServiceId, Timestamp};
use atrium_pricing::{price_service, PriceQuote, PricingContext};

use crate::auth::TenantContext;
use crate::error::AppError;
use crate::state::AppState;

use super::DEMAND_LOOKBACK_DAYS;

/// Service catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/services", post(create_service).get(list_services))
        .route(
            "/services/{id}",
            get(get_service).put(update_service).delete(deactivate_service),
        )
        .route("/services/{id}/quote", post(quote_service))
}

#[derive(Debug, Deserialize)]
struct CreateService {
    name: String,
    category: ServiceCategory,
    base_price: Money,
    unit: String,
    #[serde(default)]
    pricing_tiers: Vec<PricingTier>,
}

#[derive(Debug, Deserialize)]
struct UpdateService {
    name: String,
    category: ServiceCategory,
    base_price: Money,
    unit: String,
    #[serde(default)]
    pricing_tiers: Vec<PricingTier>,
    active: bool,
}

#[derive(Debug, Deserialize)]
struct QuoteRequest {
    quantity: u32,
    priority: RequestPriority,
    needed_by: Timestamp,
}

async fn create_service(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(body): Json<CreateService>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    let service = Service::new(
        ctx.tenant_id,
        body.name,
        body.category,
        body.base_price,
        body.unit,
        body.pricing_tiers,
    )?;
    let mut store = state.write()?;
    let id = store.catalog.insert(service)?;
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "service.create",
        id.to_string(),
        Timestamp::now(),
    );
    let created = store.catalog.get(ctx.tenant_id, id)?.clone();
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_services(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<Service>>, AppError> {
    let store = state.read()?;
    let services = store
        .catalog
        .list(ctx.tenant_id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(services))
}

async fn get_service(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>, AppError> {
    let store = state.read()?;
    let service = store.catalog.get(ctx.tenant_id, ServiceId::from(id))?.clone();
    Ok(Json(service))
}

async fn update_service(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateService>,
) -> Result<Json<Service>, AppError> {
    let id = ServiceId::from(id);
    let mut store = state.write()?;
    let mut service = store.catalog.get(ctx.tenant_id, id)?.clone();
    service.name = body.name;
    service.category = body.category;
    service.base_price = body.base_price;
    service.unit = body.unit;
    service.pricing_tiers = body.pricing_tiers;
    service.active = body.active;
    service.validate()?;
    store.catalog.update(service)?;
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "service.update",
        id.to_string(),
        Timestamp::now(),
    );
    let updated = store.catalog.get(ctx.tenant_id, id)?.clone();
    Ok(Json(updated))
}

async fn deactivate_service(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let id = ServiceId::from(id);
    let mut store = state.write()?;
    store.catalog.deactivate(ctx.tenant_id, id)?;
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "service.deactivate",
        id.to_string(),
        Timestamp::now(),
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn quote_service(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<PriceQuote>, AppError> {
    let id = ServiceId::from(id);
    let store = state.read()?;
    let service = store.catalog.get(ctx.tenant_id, id)?;
    let now = Timestamp::now();
    let pricing_ctx = PricingContext {
        recent_request_count: store.requests.count_recent(
            ctx.tenant_id,
            id,
            now.add_days(-DEMAND_LOOKBACK_DAYS),
        ),
        hours_until_needed: now.hours_until(body.needed_by),
        priority: body.priority,
    };
    let quote = price_service(service, body.quantity, &pricing_ctx)?;
    Ok(Json(quote))
}
