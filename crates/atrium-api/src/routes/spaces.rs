//! # Space & Booking Routes
//!
//! Routes:
//! - POST   /v1/spaces — register a space
//! - GET    /v1/spaces — list the tenant's spaces
//! - GET    /v1/spaces/{id} — fetch a space
//! - DELETE /v1/spaces/{id} — deactivate a space
//! - GET    /v1/spaces/{id}/bookings — bookings for one space
//! - POST   /v1/bookings — place a booking (409 on window conflict)
//! - GET    /v1/bookings — list the tenant's bookings
//! - GET    /v1/bookings/{id} — fetch a booking
//! - POST   /v1/bookings/{id}/confirm|check-in|complete|cancel|no-show

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use atrium_booking::{Booking, BookingError, Space, SpaceKind};
use atrium_core::{BookingId, MemberId, Money, SpaceId, Timestamp};

use crate::auth::TenantContext;
use crate::error::AppError;
use crate::state::AppState;

/// Spaces and bookings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/spaces", post(create_space).get(list_spaces))
        .route("/spaces/{id}", get(get_space).delete(deactivate_space))
        .route("/spaces/{id}/bookings", get(list_space_bookings))
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/confirm", post(confirm_booking))
        .route("/bookings/{id}/check-in", post(check_in_booking))
        .route("/bookings/{id}/complete", post(complete_booking))
        .route("/bookings/{id}/cancel", post(cancel_booking))
        .route("/bookings/{id}/no-show", post(no_show_booking))
}

#[derive(Debug, Deserialize)]
struct CreateSpace {
    name: String,
    kind: SpaceKind,
    capacity: u32,
    hourly_rate: Money,
}

#[derive(Debug, Deserialize)]
struct CreateBooking {
    space_id: SpaceId,
    member_id: MemberId,
    start: Timestamp,
    end: Timestamp,
}

#[derive(Debug, Deserialize)]
struct LifecycleAction {
    reason: String,
}

// ─── Spaces ──────────────────────────────────────────────────────────

async fn create_space(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(body): Json<CreateSpace>,
) -> Result<(StatusCode, Json<Space>), AppError> {
    let space = Space::new(
        ctx.tenant_id,
        body.name,
        body.kind,
        body.capacity,
        body.hourly_rate,
    )?;
    let mut store = state.write()?;
    let id = store.spaces.insert(space);
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "space.create",
        id.to_string(),
        Timestamp::now(),
    );
    let created = store.spaces.get(ctx.tenant_id, id)?.clone();
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_spaces(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<Space>>, AppError> {
    let store = state.read()?;
    let spaces = store
        .spaces
        .list(ctx.tenant_id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(spaces))
}

async fn get_space(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Space>, AppError> {
    let store = state.read()?;
    let space = store.spaces.get(ctx.tenant_id, SpaceId::from(id))?.clone();
    Ok(Json(space))
}

async fn deactivate_space(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let id = SpaceId::from(id);
    let mut store = state.write()?;
    store.spaces.deactivate(ctx.tenant_id, id)?;
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "space.deactivate",
        id.to_string(),
        Timestamp::now(),
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn list_space_bookings(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let id = SpaceId::from(id);
    let store = state.read()?;
    // 404 for unknown spaces rather than an empty list.
    store.spaces.get(ctx.tenant_id, id)?;
    let bookings = store
        .schedule
        .list_for_space(ctx.tenant_id, id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(bookings))
}

// ─── Bookings ────────────────────────────────────────────────────────

async fn create_booking(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(body): Json<CreateBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let mut store = state.write()?;
    let space = store.spaces.get(ctx.tenant_id, body.space_id)?;
    if !space.active {
        return Err(BookingError::InactiveSpace(body.space_id).into());
    }
    let booking = Booking::new(
        ctx.tenant_id,
        body.space_id,
        body.member_id,
        body.start,
        body.end,
    )?;
    let id = store.schedule.place(booking)?;
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "booking.create",
        id.to_string(),
        Timestamp::now(),
    );
    let created = store.schedule.get(ctx.tenant_id, id)?.clone();
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let store = state.read()?;
    let bookings = store
        .schedule
        .list(ctx.tenant_id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(bookings))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let store = state.read()?;
    let booking = store.schedule.get(ctx.tenant_id, BookingId::from(id))?.clone();
    Ok(Json(booking))
}

/// Apply one lifecycle transition and record it in the audit trail.
fn transition_booking(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    action: &str,
    reason: &str,
) -> Result<Json<Booking>, AppError> {
    let id = BookingId::from(id);
    let mut store = state.write()?;
    let booking = store.schedule.get_mut(ctx.tenant_id, id)?;
    match action {
        "confirm" => booking.confirm(reason)?,
        "check_in" => booking.check_in(reason)?,
        "complete" => booking.complete(reason)?,
        "cancel" => booking.cancel(reason)?,
        "no_show" => booking.mark_no_show(reason)?,
        other => return Err(AppError::Internal(format!("unroutable action: {other}"))),
    }
    let updated = booking.clone();
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        format!("booking.{action}"),
        id.to_string(),
        Timestamp::now(),
    );
    Ok(Json(updated))
}

async fn confirm_booking(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<LifecycleAction>,
) -> Result<Json<Booking>, AppError> {
    transition_booking(&state, &ctx, id, "confirm", &body.reason)
}

async fn check_in_booking(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<LifecycleAction>,
) -> Result<Json<Booking>, AppError> {
    transition_booking(&state, &ctx, id, "check_in", &body.reason)
}

async fn complete_booking(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<LifecycleAction>,
) -> Result<Json<Booking>, AppError> {
    transition_booking(&state, &ctx, id, "complete", &body.reason)
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<LifecycleAction>,
) -> Result<Json<Booking>, AppError> {
    transition_booking(&state, &ctx, id, "cancel", &body.reason)
}

async fn no_show_booking(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<LifecycleAction>,
) -> Result<Json<Booking>, AppError> {
    transition_booking(&state, &ctx, id, "no_show", &body.reason)
}
