//! # Contract & Renewal Routes
//!
//! Routes:
//! - POST /v1/contracts — draft a contract
//! - GET  /v1/contracts — list the tenant's contracts
//! - GET  /v1/contracts/{id} — fetch a contract
//! - POST /v1/contracts/{id}/activate|cancel|terminate|expire — lifecycle
//! - POST /v1/contracts/rules — create a renewal rule
//! - GET  /v1/contracts/rules — list rules
//! - POST /v1/contracts/rules/{id}/enable|disable — toggle a rule
//! - POST /v1/contracts/renewals/run — evaluate rules over expiring contracts
//! - GET  /v1/contracts/proposals — list renewal proposals
//! - POST /v1/contracts/proposals/{id}/approve|decline — decide a proposal
//! - POST /v1/contracts/proposals/{id}/execute — execute an approved proposal

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atrium_catalog::ServiceCategory;
use atrium_contracts::{
    Contract, RenewalEngine, RenewalProposal, RenewalRule, RenewalRun, TracingSink,
};
use atrium_core::{ContractId, MemberId, Money, ProposalId, RuleId, Timestamp};

use crate::auth::TenantContext;
use crate::error::AppError;
use crate::state::AppState;

/// Contracts and renewal router.
///
/// The static `rules`, `renewals`, and `proposals` segments take
/// precedence over the `{id}` capture, so both can live under
/// `/contracts`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contracts", post(create_contract).get(list_contracts))
        .route("/contracts/{id}", get(get_contract))
        .route("/contracts/{id}/activate", post(activate_contract))
        .route("/contracts/{id}/cancel", post(cancel_contract))
        .route("/contracts/{id}/terminate", post(terminate_contract))
        .route("/contracts/{id}/expire", post(expire_contract))
        .route("/contracts/rules", post(create_rule).get(list_rules))
        .route("/contracts/rules/{id}/enable", post(enable_rule))
        .route("/contracts/rules/{id}/disable", post(disable_rule))
        .route("/contracts/renewals/run", post(run_renewals))
        .route("/contracts/proposals", get(list_proposals))
        .route("/contracts/proposals/{id}/approve", post(approve_proposal))
        .route("/contracts/proposals/{id}/decline", post(decline_proposal))
        .route("/contracts/proposals/{id}/execute", post(execute_proposal))
}

#[derive(Debug, Deserialize)]
struct CreateContract {
    member_id: MemberId,
    title: String,
    #[serde(default)]
    category: Option<ServiceCategory>,
    monthly_value: Money,
    start_date: Timestamp,
    end_date: Timestamp,
    auto_renew: bool,
}

#[derive(Debug, Deserialize)]
struct LifecycleAction {
    reason: String,
}

#[derive(Debug, Deserialize)]
struct CreateRule {
    name: String,
    days_before_expiry: u32,
    min_monthly_value: Option<Money>,
    #[serde(default)]
    categories: Option<Vec<ServiceCategory>>,
    #[serde(default)]
    require_auto_renew: bool,
    #[serde(default)]
    auto_approve: bool,
    term_extension_days: u32,
    #[serde(default)]
    price_adjustment_bps: i64,
}

/// An executed proposal with the successor contract it produced.
#[derive(Debug, Serialize)]
struct ExecutionOutcome {
    proposal: RenewalProposal,
    predecessor: Contract,
    successor: Contract,
}

// ─── Contracts ───────────────────────────────────────────────────────

async fn create_contract(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(body): Json<CreateContract>,
) -> Result<(StatusCode, Json<Contract>), AppError> {
    let contract = Contract::new(
        ctx.tenant_id,
        body.member_id,
        body.title,
        body.category,
        body.monthly_value,
        body.start_date,
        body.end_date,
        body.auto_renew,
    )?;
    let mut store = state.write()?;
    let id = store.contracts.insert_contract(contract);
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "contract.create",
        id.to_string(),
        Timestamp::now(),
    );
    let created = store.contracts.contract(ctx.tenant_id, id)?.clone();
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_contracts(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<Contract>>, AppError> {
    let store = state.read()?;
    let contracts = store
        .contracts
        .list_contracts(ctx.tenant_id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(contracts))
}

async fn get_contract(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Contract>, AppError> {
    let store = state.read()?;
    let contract = store
        .contracts
        .contract(ctx.tenant_id, ContractId::from(id))?
        .clone();
    Ok(Json(contract))
}

/// Apply one lifecycle transition and record it in the audit trail.
fn transition_contract(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    action: &str,
    reason: &str,
) -> Result<Json<Contract>, AppError> {
    let id = ContractId::from(id);
    let mut store = state.write()?;
    let contract = store.contracts.contract_mut(ctx.tenant_id, id)?;
    match action {
        "activate" => contract.activate(reason)?,
        "cancel" => contract.cancel(reason)?,
        "terminate" => contract.terminate(reason)?,
        "expire" => contract.expire(reason)?,
        other => return Err(AppError::Internal(format!("unroutable action: {other}"))),
    }
    let updated = contract.clone();
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        format!("contract.{action}"),
        id.to_string(),
        Timestamp::now(),
    );
    Ok(Json(updated))
}

async fn activate_contract(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<LifecycleAction>,
) -> Result<Json<Contract>, AppError> {
    transition_contract(&state, &ctx, id, "activate", &body.reason)
}

async fn cancel_contract(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<LifecycleAction>,
) -> Result<Json<Contract>, AppError> {
    transition_contract(&state, &ctx, id, "cancel", &body.reason)
}

async fn terminate_contract(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<LifecycleAction>,
) -> Result<Json<Contract>, AppError> {
    transition_contract(&state, &ctx, id, "terminate", &body.reason)
}

async fn expire_contract(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<LifecycleAction>,
) -> Result<Json<Contract>, AppError> {
    transition_contract(&state, &ctx, id, "expire", &body.reason)
}

// ─── Renewal Rules ───────────────────────────────────────────────────

async fn create_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(body): Json<CreateRule>,
) -> Result<(StatusCode, Json<RenewalRule>), AppError> {
    let rule = RenewalRule::new(
        ctx.tenant_id,
        body.name,
        body.days_before_expiry,
        body.min_monthly_value,
        body.categories,
        body.require_auto_renew,
        body.auto_approve,
        body.term_extension_days,
        body.price_adjustment_bps,
    )?;
    let mut store = state.write()?;
    let id = store.contracts.insert_rule(rule);
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "renewal_rule.create",
        id.to_string(),
        Timestamp::now(),
    );
    let created = store.contracts.rule(ctx.tenant_id, id)?.clone();
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_rules(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<RenewalRule>>, AppError> {
    let store = state.read()?;
    let rules = store
        .contracts
        .list_rules(ctx.tenant_id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(rules))
}

/// Enable or disable a rule and record it in the audit trail.
fn set_rule_enabled(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    enabled: bool,
) -> Result<Json<RenewalRule>, AppError> {
    let id = RuleId::from(id);
    let mut store = state.write()?;
    let rule = store.contracts.rule_mut(ctx.tenant_id, id)?;
    rule.enabled = enabled;
    let updated = rule.clone();
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        if enabled {
            "renewal_rule.enable"
        } else {
            "renewal_rule.disable"
        },
        id.to_string(),
        Timestamp::now(),
    );
    Ok(Json(updated))
}

async fn enable_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenewalRule>, AppError> {
    set_rule_enabled(&state, &ctx, id, true)
}

async fn disable_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenewalRule>, AppError> {
    set_rule_enabled(&state, &ctx, id, false)
}

// ─── Renewal Runs & Proposals ────────────────────────────────────────

async fn run_renewals(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<RenewalRun>, AppError> {
    let mut store = state.write()?;
    let now = Timestamp::now();

    let rules = store.contracts.rules_snapshot(ctx.tenant_id);
    let open = store.contracts.open_proposal_contracts(ctx.tenant_id);
    let contracts = store.contracts.list_contracts(ctx.tenant_id);
    let run = RenewalEngine::run(&rules, &contracts, &open, now)?;

    for proposal in &run.proposals {
        store.contracts.insert_proposal(proposal.clone());
    }
    RenewalEngine::fan_out(&mut TracingSink, &run.notifications);
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "renewal.run",
        format!("{} proposal(s)", run.proposals.len()),
        now,
    );
    Ok(Json(run))
}

async fn list_proposals(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> Result<Json<Vec<RenewalProposal>>, AppError> {
    let store = state.read()?;
    let proposals = store
        .contracts
        .list_proposals(ctx.tenant_id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(proposals))
}

/// Decide a pending proposal and record it in the audit trail.
fn decide_proposal(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    approve: bool,
) -> Result<Json<RenewalProposal>, AppError> {
    let id = ProposalId::from(id);
    let mut store = state.write()?;
    let now = Timestamp::now();
    let proposal = store.contracts.proposal_mut(ctx.tenant_id, id)?;
    if approve {
        proposal.approve(now)?;
    } else {
        proposal.decline(now)?;
    }
    let updated = proposal.clone();
    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        if approve {
            "proposal.approve"
        } else {
            "proposal.decline"
        },
        id.to_string(),
        now,
    );
    Ok(Json(updated))
}

async fn approve_proposal(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenewalProposal>, AppError> {
    decide_proposal(&state, &ctx, id, true)
}

async fn decline_proposal(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenewalProposal>, AppError> {
    decide_proposal(&state, &ctx, id, false)
}

async fn execute_proposal(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExecutionOutcome>, AppError> {
    let id = ProposalId::from(id);
    let mut store = state.write()?;
    let now = Timestamp::now();

    // Execute on clones so a failure leaves the registry untouched.
    let mut proposal = store.contracts.proposal(ctx.tenant_id, id)?.clone();
    let contract_id = proposal.contract_id;
    let mut predecessor = store.contracts.contract(ctx.tenant_id, contract_id)?.clone();
    let successor = RenewalEngine::execute(&mut proposal, &mut predecessor, now)?;

    *store.contracts.proposal_mut(ctx.tenant_id, id)? = proposal.clone();
    *store.contracts.contract_mut(ctx.tenant_id, contract_id)? = predecessor.clone();
    let successor_id = store.contracts.insert_contract(successor.clone());

    store.audit.append(
        ctx.tenant_id,
        &ctx.actor,
        "proposal.execute",
        format!("{id} -> {successor_id}"),
        now,
    );
    Ok(Json(ExecutionOutcome {
        proposal,
        predecessor,
        successor,
    }))
}
