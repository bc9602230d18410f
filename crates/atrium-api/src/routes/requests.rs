//! # Service Request Routes
//!
//! Routes:
//! - POST /v1/requests — submit a request (priced at submission)
//! - GET  /v1/requests — list the tenant's requests
//! - GET  /v1/requests/{id} — fetch a request with its quote
//! - POST /v1/requests/{id}/transition — advance the workflow

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atrium_catalog::{RequestPriority, ServiceRequest};
use atrium_core::{MemberId, RequestId, ServiceId, Timestamp};
use atrium_pricing::{price_service, PriceQuote, PricingContext};

use crate::auth::TenantContext;
use crate::error::AppError;
use crate::state::AppState;

use super::DEMAND_LOOKBACK_DAYS;

/// Service request router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_request).get(list_requests))
        .route("/requests/{id}", get(get_request))
        .route("/requests/{id}/transition", post(transition_request))
}

#[derive(Debug, Deserialize)]
struct CreateRequest {
    service_id: ServiceId,
    member_id: MemberId,
    quantity: u32,
    priority: RequestPriority,
    needed_by: Timestamp,
}

/// A request together with the quote computed when it was priced.
#[derive(Debug, Serialize)]
struct RequestWithQuote {
    request: ServiceRequest,
    quote: Option<PriceQuote>,
}

#[derive(Debug, Deserialize)]
struct TransitionRequest {
    action: String,
    reason: String,
}

async fn create_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(body): Json<CreateRequest>,
) -> Result<(StatusCode, Json<RequestWithQuote>), AppError> {
    let mut store = state.write()?;
    let now = Timestamp::now();

    // Price before inserting so the new request does not count toward
    // its own demand signal.
    let service = store.catalog.get(ctx.tenant_id, body.service_id)?;
    let pricing_ctx = PricingContext {
        recent_request_count: store.requests.count_recent(
            ctx.tenant_id,
            body.service_id,
            now.add_days(-DEMAND_LOOKBACK_DAYS),
        ),
        hours_until_needed: now.hours_until(body.needed_by),
        priority: body.priority,
    };
    let quote = price_service(service, body.quantity, &pricing_ctx)?;

    let request = ServiceRequest::new(
        ctx.tenant_id,
        body.service_id,
        body.member_id,
        body.quantity,
        body.priority,
        body.needed_by,
    )?;
    let id = store.requests.insert(request);
    store.quotes.insert(id, quote.clone());
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "request.create",
        id.to_string(),
        now,
    );

    let request = store.requests.get(ctx.tenant_id, id)?.clone();
    Ok((
        StatusCode::CREATED,
        Json(RequestWithQuote {
            request,
            quote: Some(quote),
        }),
    ))
}

async fn list_requests(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<ServiceRequest>>, AppError> {
    let store = state.read()?;
    let requests = store
        .requests
        .list(ctx.tenant_id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(requests))
}

async fn get_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestWithQuote>, AppError> {
    let id = RequestId::from(id);
    let store = state.read()?;
    let request = store.requests.get(ctx.tenant_id, id)?.clone();
    let quote = store.quotes.get(&id).cloned();
    Ok(Json(RequestWithQuote { request, quote }))
}

async fn transition_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<ServiceRequest>, AppError> {
    let id = RequestId::from(id);
    let mut store = state.write()?;
    let request = store.requests.get_mut(ctx.tenant_id, id)?;
    match body.action.as_str() {
        "begin_review" => request.begin_review(&body.reason)?,
        "approve" => request.approve(&body.reason)?,
        "start_fulfilment" => request.start_fulfilment(&body.reason)?,
        "complete" => request.complete(&body.reason)?,
        "reject" => request.reject(&body.reason)?,
        "cancel" => request.cancel(&body.reason)?,
        other => {
            return Err(AppError::Validation(format!(
                "unknown request action: {other}"
            )))
        }
    }
    let updated = request.clone();
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        format!("request.{}", body.action),
        id.to_string(),
        Timestamp::now(),
    );
    Ok(Json(updated))
}
