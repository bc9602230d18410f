//! # Route Modules
//!
//! Each module defines an Axum Router for one API surface area.
//! [`app`] assembles them into the application: every `/v1` route sits
//! behind the auth middleware, health probes do not.

use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::state::AppState;

pub mod compliance;
pub mod contracts;
pub mod requests;
pub mod services;
pub mod spaces;

/// Days of request history the demand multiplier looks back over.
pub(crate) const DEMAND_LOOKBACK_DAYS: i64 = 30;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(services::router())
        .merge(requests::router())
        .merge(contracts::router())
        .merge(compliance::router())
        .merge(spaces::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .nest("/v1", api)
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe.
async fn health_live() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe. The store is in-process, so ready equals live.
async fn health_ready() -> StatusCode {
    StatusCode::OK
}
