//! # Compliance Routes
//!
//! Routes:
//! - GET  /v1/compliance/reports/{framework} — generate a report
//! - POST /v1/compliance/consents — record a consent statement
//! - GET  /v1/compliance/consents — list the tenant's consent ledger
//! - POST /v1/compliance/consents/{id}/withdraw — withdraw a consent record
//! - POST /v1/compliance/retention — create a retention policy
//! - GET  /v1/compliance/retention — list policies
//! - POST /v1/compliance/retention/evaluate — report purge candidates
//! - GET  /v1/compliance/audit-trail — the tenant's audit events
//! - GET  /v1/compliance/audit-trail/verify — recompute the hash chain
//!
//! Report generation aggregates a [`ComplianceSnapshot`] from the live
//! stores here; the generator itself is pure.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atrium_compliance::{
    generate_report, AuditEvent, ComplianceFramework, ComplianceReport, ComplianceSnapshot,
    ConsentPurpose, ConsentRecord, PurgeReport, RecordKind, RecordStamp, ReportingPeriod,
    RetentionPolicy,
};
use atrium_contracts::ContractState;
use atrium_core::{ConsentId, MemberId, TenantId, Timestamp};

use crate::auth::TenantContext;
use crate::error::AppError;
use crate::state::{AppState, Store};

/// Reports cover the trailing 30 days of platform activity.
const REPORT_PERIOD_DAYS: i64 = 30;

/// Compliance router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/compliance/reports/{framework}", get(get_report))
        .route(
            "/compliance/consents",
            post(record_consent).get(list_consents),
        )
        .route("/compliance/consents/{id}/withdraw", post(withdraw_consent))
        .route(
            "/compliance/retention",
            post(create_retention_policy).get(list_retention_policies),
        )
        .route("/compliance/retention/evaluate", post(evaluate_retention))
        .route("/compliance/audit-trail", get(list_audit_events))
        .route("/compliance/audit-trail/verify", get(verify_audit_trail))
}

#[derive(Debug, Deserialize)]
struct RecordConsent {
    member_id: MemberId,
    purpose: ConsentPurpose,
    granted: bool,
    version: String,
}

#[derive(Debug, Deserialize)]
struct CreateRetentionPolicy {
    record_kind: RecordKind,
    retain_days: u32,
}

#[derive(Debug, Serialize)]
struct VerifyResponse {
    verified_events: usize,
}

/// Every governed record in the tenant's stores, stamped for retention
/// evaluation.
fn record_stamps(store: &Store, tenant_id: TenantId) -> Vec<RecordStamp> {
    let mut stamps = Vec::new();
    for request in store.requests.list(tenant_id) {
        stamps.push(RecordStamp {
            kind: RecordKind::ServiceRequest,
            created_at: request.created_at,
        });
    }
    for contract in store.contracts.list_contracts(tenant_id) {
        stamps.push(RecordStamp {
            kind: RecordKind::Contract,
            created_at: contract.created_at,
        });
    }
    for booking in store.schedule.list(tenant_id) {
        stamps.push(RecordStamp {
            kind: RecordKind::Booking,
            created_at: booking.created_at,
        });
    }
    for record in store.consents.list(tenant_id) {
        stamps.push(RecordStamp {
            kind: RecordKind::ConsentRecord,
            created_at: record.recorded_at,
        });
    }
    stamps
}

/// Aggregate the point-in-time evidence the report generator consumes.
fn snapshot(store: &Store, tenant_id: TenantId, now: Timestamp) -> ComplianceSnapshot {
    let contracts = store.contracts.list_contracts(tenant_id);
    let activated: Vec<_> = contracts
        .iter()
        .filter(|c| {
            c.transitions
                .iter()
                .any(|t| t.to_state == ContractState::Active)
        })
        .collect();
    let with_approval = activated
        .iter()
        .filter(|c| {
            c.transitions
                .iter()
                .any(|t| t.to_state == ContractState::Active && !t.reason.trim().is_empty())
        })
        .count();

    let purge_report = store
        .retention
        .evaluate(tenant_id, &record_stamps(store, tenant_id), now);

    ComplianceSnapshot {
        contracts_activated: activated.len(),
        contracts_with_approval: with_approval,
        audit_events: store.audit.len(tenant_id),
        audit_chain_intact: store.audit.verify(tenant_id).is_ok(),
        members_seen: store.consents.members_seen(tenant_id).len(),
        members_with_essential_consent: store
            .consents
            .members_with_consent(tenant_id, ConsentPurpose::Essential)
            .len(),
        retention_kinds_covered: store.retention.covered_kinds(tenant_id).len(),
        overdue_purge_candidates: purge_report.candidates.len(),
        // Structural facts about this service: every /v1 route sits
        // behind the auth middleware, and no store models card data.
        all_routes_authenticated: true,
        stores_payment_card_data: false,
    }
}

async fn get_report(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(framework): Path<String>,
) -> Result<Json<ComplianceReport>, AppError> {
    let framework: ComplianceFramework = framework.parse()?;
    let mut store = state.write()?;
    let now = Timestamp::now();
    let period = ReportingPeriod::trailing_days(now, REPORT_PERIOD_DAYS);
    let report = generate_report(
        ctx.tenant_id,
        framework,
        period,
        &snapshot(&store, ctx.tenant_id, now),
        now,
    );
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "compliance.report",
        report.id.to_string(),
        now,
    );
    Ok(Json(report))
}

// ─── Consent ─────────────────────────────────────────────────────────

async fn record_consent(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(body): Json<RecordConsent>,
) -> Result<(StatusCode, Json<ConsentRecord>), AppError> {
    let mut store = state.write()?;
    let now = Timestamp::now();
    let id = store.consents.record(
        ctx.tenant_id,
        body.member_id,
        body.purpose,
        body.granted,
        body.version,
        now,
    );
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "consent.record",
        id.to_string(),
        now,
    );
    let record = store
        .consents
        .list(ctx.tenant_id)
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .ok_or_else(|| AppError::Internal("consent record vanished after insert".to_string()))?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_consents(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<ConsentRecord>>, AppError> {
    let store = state.read()?;
    Ok(Json(store.consents.list(ctx.tenant_id).to_vec()))
}

async fn withdraw_consent(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let id = ConsentId::from(id);
    let mut store = state.write()?;
    let now = Timestamp::now();
    store.consents.withdraw(ctx.tenant_id, id, now)?;
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "consent.withdraw",
        id.to_string(),
        now,
    );
    Ok(StatusCode::NO_CONTENT)
}

// ─── Retention ───────────────────────────────────────────────────────

async fn create_retention_policy(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(body): Json<CreateRetentionPolicy>,
) -> Result<(StatusCode, Json<RetentionPolicy>), AppError> {
    let policy = RetentionPolicy::new(ctx.tenant_id, body.record_kind, body.retain_days)?;
    let mut store = state.write()?;
    let id = store.retention.insert(policy);
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "retention_policy.create",
        id.to_string(),
        Timestamp::now(),
    );
    let created = store.retention.get(ctx.tenant_id, id)?.clone();
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_retention_policies(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<RetentionPolicy>>, AppError> {
    let store = state.read()?;
    let policies = store
        .retention
        .list(ctx.tenant_id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(policies))
}

async fn evaluate_retention(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<PurgeReport>, AppError> {
    let mut store = state.write()?;
    let now = Timestamp::now();
    let report = store
        .retention
        .evaluate(ctx.tenant_id, &record_stamps(&store, ctx.tenant_id), now);
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "retention.evaluate",
        format!("{} candidate(s)", report.candidates.len()),
        now,
    );
    Ok(Json(report))
}

// ─── Audit Trail ─────────────────────────────────────────────────────

async fn list_audit_events(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<AuditEvent>>, AppError> {
    let store = state.read()?;
    Ok(Json(store.audit.events(ctx.tenant_id).to_vec()))
}

async fn verify_audit_trail(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<VerifyResponse>, AppError> {
    let store = state.read()?;
    let verified_events = store.audit.verify(ctx.tenant_id)?;
    Ok(Json(VerifyResponse { verified_events }))
}
