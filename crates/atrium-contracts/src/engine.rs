//! # Renewal Engine
//!
//! Evaluates the tenant's renewal rules over its contracts and emits
//! proposals plus notifications. One run is a pure function of its
//! inputs; persistence of the emitted proposals is the caller's concern.
//!
//! ## Evaluation order
//!
//! - Rules are evaluated in ascending `days_before_expiry`, ties broken
//!   by name — the tightest window wins.
//! - Contracts are visited in ascending end date (ties by id), so runs
//!   are deterministic regardless of registry iteration order.
//! - The first matching rule wins; at most one proposal per contract per
//!   run; contracts with an open proposal are skipped entirely.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atrium_core::{ContractId, MemberId, ProposalId, TenantId, Timestamp};

use crate::contract::{Contract, ContractError};
use crate::proposal::{ProposalError, ProposalState, RenewalProposal};
use crate::rules::{RenewalRule, RuleError};

// ─── Notifications ───────────────────────────────────────────────────

/// What a renewal notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A proposal was created and awaits a decision.
    ProposalCreated,
    /// A proposal was created pre-approved by its rule.
    ProposalAutoApproved,
}

/// A notification emitted by a renewal run, one per proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalNotification {
    /// The tenant the notification belongs to.
    pub tenant_id: TenantId,
    /// The contract being renewed.
    pub contract_id: ContractId,
    /// The generated proposal.
    pub proposal_id: ProposalId,
    /// The member to notify.
    pub member_id: MemberId,
    /// What happened.
    pub kind: NotificationKind,
    /// Human-readable summary.
    pub message: String,
    /// When the notification was generated.
    pub created_at: Timestamp,
}

/// Delivery target for renewal notifications.
///
/// The platform delivers in-process only; sinks exist so the API layer
/// can collect notifications while operators read them back, and so
/// tests can observe fan-out.
pub trait NotificationSink {
    /// Deliver one notification.
    fn deliver(&mut self, notification: &RenewalNotification);
}

/// Sink that retains every delivered notification.
#[derive(Debug, Default)]
pub struct InMemorySink {
    /// Notifications in delivery order.
    pub delivered: Vec<RenewalNotification>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSink for InMemorySink {
    fn deliver(&mut self, notification: &RenewalNotification) {
        self.delivered.push(notification.clone());
    }
}

/// Sink that logs each notification through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn deliver(&mut self, notification: &RenewalNotification) {
        tracing::info!(
            tenant = %notification.tenant_id,
            contract = %notification.contract_id,
            proposal = %notification.proposal_id,
            kind = ?notification.kind,
            "renewal notification"
        );
    }
}

// ─── Engine ──────────────────────────────────────────────────────────

/// Errors from a renewal run or proposal execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A rule's price adjustment failed against a contract value.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// Contract transition failed during execution.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Proposal transition failed during execution.
    #[error(transparent)]
    Proposal(#[from] ProposalError),

    /// The proposal does not reference the supplied contract.
    #[error("proposal {proposal_id} does not target contract {contract_id}")]
    ContractMismatch {
        /// The proposal.
        proposal_id: ProposalId,
        /// The contract that was supplied.
        contract_id: ContractId,
    },
}

/// The outcome of one renewal run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalRun {
    /// When the run was evaluated.
    pub evaluated_at: Timestamp,
    /// Contracts examined.
    pub contracts_evaluated: usize,
    /// Contracts skipped because an open proposal already exists.
    pub skipped_open_proposal: usize,
    /// Generated proposals, in contract evaluation order.
    pub proposals: Vec<RenewalProposal>,
    /// One notification per generated proposal.
    pub notifications: Vec<RenewalNotification>,
}

/// The renewal rule engine.
#[derive(Debug, Default)]
pub struct RenewalEngine;

impl RenewalEngine {
    /// Evaluate `rules` over `contracts` at time `now`.
    ///
    /// `open_proposals` holds the contracts that already have a Pending
    /// or Approved proposal; they are skipped so a contract never
    /// accumulates competing proposals.
    pub fn run(
        rules: &[RenewalRule],
        contracts: &[&Contract],
        open_proposals: &HashSet<ContractId>,
        now: Timestamp,
    ) -> Result<RenewalRun, EngineError> {
        // Tightest window first; name breaks ties.
        let mut ordered_rules: Vec<&RenewalRule> = rules.iter().filter(|r| r.enabled).collect();
        ordered_rules.sort_by(|a, b| {
            a.days_before_expiry
                .cmp(&b.days_before_expiry)
                .then_with(|| a.name.cmp(&b.name))
        });

        // Soonest-expiring contract first; id breaks ties.
        let mut ordered_contracts: Vec<&Contract> = contracts.to_vec();
        ordered_contracts.sort_by(|a, b| a.end_date.cmp(&b.end_date).then(a.id.cmp(&b.id)));

        let mut run = RenewalRun {
            evaluated_at: now,
            contracts_evaluated: 0,
            skipped_open_proposal: 0,
            proposals: Vec::new(),
            notifications: Vec::new(),
        };

        for contract in ordered_contracts {
            run.contracts_evaluated += 1;
            if open_proposals.contains(&contract.id) {
                run.skipped_open_proposal += 1;
                continue;
            }
            let Some(rule) = ordered_rules.iter().find(|r| r.matches(contract, now)) else {
                continue;
            };

            let proposed_monthly_value = rule.adjusted_value(contract.monthly_value)?;
            let (state, decided_at, kind) = if rule.auto_approve {
                (
                    ProposalState::Approved,
                    Some(now),
                    NotificationKind::ProposalAutoApproved,
                )
            } else {
                (ProposalState::Pending, None, NotificationKind::ProposalCreated)
            };

            let proposal = RenewalProposal {
                id: ProposalId::new(),
                tenant_id: contract.tenant_id,
                contract_id: contract.id,
                rule_id: rule.id,
                proposed_start: contract.end_date,
                proposed_end: contract.end_date.add_days(i64::from(rule.term_extension_days)),
                proposed_monthly_value,
                state,
                created_at: now,
                decided_at,
            };

            run.notifications.push(RenewalNotification {
                tenant_id: contract.tenant_id,
                contract_id: contract.id,
                proposal_id: proposal.id,
                member_id: contract.member_id,
                kind,
                message: format!(
                    "renewal proposal for \"{}\" via rule \"{}\": {} through {}",
                    contract.title, rule.name, proposal.proposed_monthly_value, proposal.proposed_end
                ),
                created_at: now,
            });
            run.proposals.push(proposal);
        }

        Ok(run)
    }

    /// Deliver a run's notifications through a sink.
    pub fn fan_out(sink: &mut dyn NotificationSink, notifications: &[RenewalNotification]) {
        for notification in notifications {
            sink.deliver(notification);
        }
    }

    /// Execute an approved proposal against its contract.
    ///
    /// Marks the contract Renewed, the proposal Executed, and returns
    /// the successor contract — already Active, carrying the proposed
    /// term and value and the predecessor's auto-renew election.
    pub fn execute(
        proposal: &mut RenewalProposal,
        contract: &mut Contract,
        now: Timestamp,
    ) -> Result<Contract, EngineError> {
        if proposal.contract_id != contract.id {
            return Err(EngineError::ContractMismatch {
                proposal_id: proposal.id,
                contract_id: contract.id,
            });
        }
        // Validate both sides before mutating either.
        if proposal.state != ProposalState::Approved {
            return Err(ProposalError::InvalidTransition {
                from: proposal.state.to_string(),
                to: ProposalState::Executed.to_string(),
            }
            .into());
        }

        let mut successor = Contract::new(
            contract.tenant_id,
            contract.member_id,
            contract.title.clone(),
            contract.category,
            proposal.proposed_monthly_value,
            proposal.proposed_start,
            proposal.proposed_end,
            contract.auto_renew,
        )?;

        contract.mark_renewed("renewal proposal executed")?;
        proposal.mark_executed(now)?;
        successor.activate("renewal of predecessor contract")?;
        Ok(successor)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::{Currency, Money};

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::Usd)
    }

    fn now() -> Timestamp {
        Timestamp::parse("2026-06-01T00:00:00Z").unwrap()
    }

    fn active_contract(tenant: TenantId, days_left: i64, value: i64) -> Contract {
        let mut c = Contract::new(
            tenant,
            MemberId::new(),
            "dedicated desk",
            Some(atrium_catalog::ServiceCategory::Desk),
            usd(value),
            now().add_days(days_left - 365),
            now().add_days(days_left),
            true,
        )
        .unwrap();
        c.activate("signed").unwrap();
        c
    }

    fn rule(tenant: TenantId, name: &str, days: u32, auto: bool) -> RenewalRule {
        RenewalRule::new(tenant, name, days, None, None, false, auto, 365, 300).unwrap()
    }

    // ── Proposal generation ──────────────────────────────────────────

    #[test]
    fn test_run_generates_proposal_for_expiring_contract() {
        let tenant = TenantId::new();
        let contract = active_contract(tenant, 20, 45_000);
        let rules = vec![rule(tenant, "standard", 30, false)];

        let run = RenewalEngine::run(&rules, &[&contract], &HashSet::new(), now()).unwrap();

        assert_eq!(run.proposals.len(), 1);
        let p = &run.proposals[0];
        assert_eq!(p.contract_id, contract.id);
        assert_eq!(p.state, ProposalState::Pending);
        assert_eq!(p.proposed_start, contract.end_date);
        assert_eq!(p.proposed_end, contract.end_date.add_days(365));
        // +3% of $450.00
        assert_eq!(p.proposed_monthly_value, usd(46_350));
    }

    #[test]
    fn test_contract_outside_all_windows_is_skipped() {
        let tenant = TenantId::new();
        let contract = active_contract(tenant, 90, 45_000);
        let rules = vec![rule(tenant, "standard", 30, false)];

        let run = RenewalEngine::run(&rules, &[&contract], &HashSet::new(), now()).unwrap();
        assert!(run.proposals.is_empty());
        assert_eq!(run.contracts_evaluated, 1);
    }

    #[test]
    fn test_auto_approve_rule_creates_approved_proposal() {
        let tenant = TenantId::new();
        let contract = active_contract(tenant, 20, 45_000);
        let rules = vec![rule(tenant, "auto", 30, true)];

        let run = RenewalEngine::run(&rules, &[&contract], &HashSet::new(), now()).unwrap();
        assert_eq!(run.proposals[0].state, ProposalState::Approved);
        assert_eq!(run.proposals[0].decided_at, Some(now()));
        assert_eq!(
            run.notifications[0].kind,
            NotificationKind::ProposalAutoApproved
        );
    }

    // ── Rule precedence ──────────────────────────────────────────────

    #[test]
    fn test_tightest_window_rule_wins() {
        let tenant = TenantId::new();
        let contract = active_contract(tenant, 10, 45_000);
        let wide = rule(tenant, "wide", 60, false);
        let tight = rule(tenant, "tight", 14, true);
        let rules = vec![wide.clone(), tight.clone()];

        let run = RenewalEngine::run(&rules, &[&contract], &HashSet::new(), now()).unwrap();
        assert_eq!(run.proposals[0].rule_id, tight.id);
    }

    #[test]
    fn test_equal_windows_tie_break_by_name() {
        let tenant = TenantId::new();
        let contract = active_contract(tenant, 10, 45_000);
        let b = rule(tenant, "beta", 30, false);
        let a = rule(tenant, "alpha", 30, false);
        let rules = vec![b.clone(), a.clone()];

        let run = RenewalEngine::run(&rules, &[&contract], &HashSet::new(), now()).unwrap();
        assert_eq!(run.proposals[0].rule_id, a.id);
    }

    #[test]
    fn test_disabled_rules_are_ignored() {
        let tenant = TenantId::new();
        let contract = active_contract(tenant, 10, 45_000);
        let mut r = rule(tenant, "off", 30, false);
        r.enabled = false;

        let run = RenewalEngine::run(&[r], &[&contract], &HashSet::new(), now()).unwrap();
        assert!(run.proposals.is_empty());
    }

    // ── Dedup & fan-out ──────────────────────────────────────────────

    #[test]
    fn test_open_proposal_blocks_second_proposal() {
        let tenant = TenantId::new();
        let contract = active_contract(tenant, 20, 45_000);
        let rules = vec![rule(tenant, "standard", 30, false)];

        let mut open = HashSet::new();
        open.insert(contract.id);
        let run = RenewalEngine::run(&rules, &[&contract], &open, now()).unwrap();
        assert!(run.proposals.is_empty());
        assert_eq!(run.skipped_open_proposal, 1);
    }

    #[test]
    fn test_one_notification_per_proposal() {
        let tenant = TenantId::new();
        let c1 = active_contract(tenant, 10, 45_000);
        let c2 = active_contract(tenant, 20, 60_000);
        let rules = vec![rule(tenant, "standard", 30, false)];

        let run = RenewalEngine::run(&rules, &[&c1, &c2], &HashSet::new(), now()).unwrap();
        assert_eq!(run.proposals.len(), 2);
        assert_eq!(run.notifications.len(), 2);

        let mut sink = InMemorySink::new();
        RenewalEngine::fan_out(&mut sink, &run.notifications);
        assert_eq!(sink.delivered.len(), 2);
        // Contracts are visited soonest-expiring first.
        assert_eq!(sink.delivered[0].contract_id, c1.id);
    }

    // ── Execution ────────────────────────────────────────────────────

    #[test]
    fn test_execute_approved_proposal() {
        let tenant = TenantId::new();
        let mut contract = active_contract(tenant, 20, 45_000);
        let rules = vec![rule(tenant, "auto", 30, true)];
        let run = RenewalEngine::run(&rules, &[&contract], &HashSet::new(), now()).unwrap();
        let mut proposal = run.proposals.into_iter().next().unwrap();

        let successor = RenewalEngine::execute(&mut proposal, &mut contract, now()).unwrap();

        assert_eq!(contract.state, crate::contract::ContractState::Renewed);
        assert_eq!(proposal.state, ProposalState::Executed);
        assert_eq!(successor.state, crate::contract::ContractState::Active);
        assert_eq!(successor.start_date, contract.end_date);
        assert_eq!(successor.monthly_value, usd(46_350));
        assert_eq!(successor.member_id, contract.member_id);
    }

    #[test]
    fn test_execute_pending_proposal_fails_without_mutation() {
        let tenant = TenantId::new();
        let mut contract = active_contract(tenant, 20, 45_000);
        let rules = vec![rule(tenant, "manual", 30, false)];
        let run = RenewalEngine::run(&rules, &[&contract], &HashSet::new(), now()).unwrap();
        let mut proposal = run.proposals.into_iter().next().unwrap();

        let result = RenewalEngine::execute(&mut proposal, &mut contract, now());
        assert!(matches!(result, Err(EngineError::Proposal(_))));
        assert_eq!(contract.state, crate::contract::ContractState::Active);
        assert_eq!(proposal.state, ProposalState::Pending);
    }

    #[test]
    fn test_execute_wrong_contract_rejected() {
        let tenant = TenantId::new();
        let contract = active_contract(tenant, 20, 45_000);
        let mut other = active_contract(tenant, 20, 45_000);
        let rules = vec![rule(tenant, "auto", 30, true)];
        let run = RenewalEngine::run(&rules, &[&contract], &HashSet::new(), now()).unwrap();
        let mut proposal = run.proposals.into_iter().next().unwrap();

        let result = RenewalEngine::execute(&mut proposal, &mut other, now());
        assert!(matches!(result, Err(EngineError::ContractMismatch { .. })));
    }

    // ── Determinism ──────────────────────────────────────────────────

    #[test]
    fn test_rerun_after_persisting_open_proposals_is_idempotent() {
        let tenant = TenantId::new();
        let contract = active_contract(tenant, 20, 45_000);
        let rules = vec![rule(tenant, "standard", 30, false)];

        let first = RenewalEngine::run(&rules, &[&contract], &HashSet::new(), now()).unwrap();
        let open: HashSet<ContractId> =
            first.proposals.iter().map(|p| p.contract_id).collect();
        let second = RenewalEngine::run(&rules, &[&contract], &open, now()).unwrap();

        assert_eq!(first.proposals.len(), 1);
        assert!(second.proposals.is_empty());
    }
}
