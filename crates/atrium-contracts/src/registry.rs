//! # Contract Registry
//!
//! Tenant-scoped storage for contracts, renewal rules, and proposals,
//! plus the open-proposal index the engine's dedup check feeds on.

use std::collections::{HashMap, HashSet};

use atrium_core::{ContractId, ProposalId, RuleId, TenantId};

use crate::contract::{Contract, ContractError};
use crate::proposal::{ProposalError, RenewalProposal};
use crate::rules::{RenewalRule, RuleError};

/// Tenant-scoped registry of contracts, rules, and proposals.
#[derive(Debug, Default)]
pub struct ContractRegistry {
    contracts: HashMap<TenantId, HashMap<ContractId, Contract>>,
    rules: HashMap<TenantId, HashMap<RuleId, RenewalRule>>,
    proposals: HashMap<TenantId, HashMap<ProposalId, RenewalProposal>>,
}

impl ContractRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Contracts ────────────────────────────────────────────────────

    /// Insert a contract.
    pub fn insert_contract(&mut self, contract: Contract) -> ContractId {
        let id = contract.id;
        self.contracts
            .entry(contract.tenant_id)
            .or_default()
            .insert(id, contract);
        id
    }

    /// Fetch a contract.
    pub fn contract(&self, tenant_id: TenantId, id: ContractId) -> Result<&Contract, ContractError> {
        self.contracts
            .get(&tenant_id)
            .and_then(|m| m.get(&id))
            .ok_or(ContractError::NotFound(id))
    }

    /// Fetch a contract mutably (for lifecycle transitions).
    pub fn contract_mut(
        &mut self,
        tenant_id: TenantId,
        id: ContractId,
    ) -> Result<&mut Contract, ContractError> {
        self.contracts
            .get_mut(&tenant_id)
            .and_then(|m| m.get_mut(&id))
            .ok_or(ContractError::NotFound(id))
    }

    /// List the tenant's contracts, soonest-expiring first.
    pub fn list_contracts(&self, tenant_id: TenantId) -> Vec<&Contract> {
        let mut contracts: Vec<&Contract> = self
            .contracts
            .get(&tenant_id)
            .map(|m| m.values().collect())
            .unwrap_or_default();
        contracts.sort_by(|a, b| a.end_date.cmp(&b.end_date).then(a.id.cmp(&b.id)));
        contracts
    }

    // ── Rules ────────────────────────────────────────────────────────

    /// Insert a renewal rule.
    pub fn insert_rule(&mut self, rule: RenewalRule) -> RuleId {
        let id = rule.id;
        self.rules.entry(rule.tenant_id).or_default().insert(id, rule);
        id
    }

    /// Fetch a rule.
    pub fn rule(&self, tenant_id: TenantId, id: RuleId) -> Result<&RenewalRule, RuleError> {
        self.rules
            .get(&tenant_id)
            .and_then(|m| m.get(&id))
            .ok_or(RuleError::NotFound(id))
    }

    /// Fetch a rule mutably (enable/disable, parameter edits).
    pub fn rule_mut(&mut self, tenant_id: TenantId, id: RuleId) -> Result<&mut RenewalRule, RuleError> {
        self.rules
            .get_mut(&tenant_id)
            .and_then(|m| m.get_mut(&id))
            .ok_or(RuleError::NotFound(id))
    }

    /// List the tenant's rules in engine evaluation order.
    pub fn list_rules(&self, tenant_id: TenantId) -> Vec<&RenewalRule> {
        let mut rules: Vec<&RenewalRule> = self
            .rules
            .get(&tenant_id)
            .map(|m| m.values().collect())
            .unwrap_or_default();
        rules.sort_by(|a, b| {
            a.days_before_expiry
                .cmp(&b.days_before_expiry)
                .then_with(|| a.name.cmp(&b.name))
        });
        rules
    }

    /// Clone the tenant's rules (for handing a snapshot to the engine).
    pub fn rules_snapshot(&self, tenant_id: TenantId) -> Vec<RenewalRule> {
        self.list_rules(tenant_id).into_iter().cloned().collect()
    }

    // ── Proposals ────────────────────────────────────────────────────

    /// Insert a proposal emitted by a renewal run.
    pub fn insert_proposal(&mut self, proposal: RenewalProposal) -> ProposalId {
        let id = proposal.id;
        self.proposals
            .entry(proposal.tenant_id)
            .or_default()
            .insert(id, proposal);
        id
    }

    /// Fetch a proposal.
    pub fn proposal(
        &self,
        tenant_id: TenantId,
        id: ProposalId,
    ) -> Result<&RenewalProposal, ProposalError> {
        self.proposals
            .get(&tenant_id)
            .and_then(|m| m.get(&id))
            .ok_or(ProposalError::NotFound(id))
    }

    /// Fetch a proposal mutably (decisions, execution).
    pub fn proposal_mut(
        &mut self,
        tenant_id: TenantId,
        id: ProposalId,
    ) -> Result<&mut RenewalProposal, ProposalError> {
        self.proposals
            .get_mut(&tenant_id)
            .and_then(|m| m.get_mut(&id))
            .ok_or(ProposalError::NotFound(id))
    }

    /// List the tenant's proposals, newest first.
    pub fn list_proposals(&self, tenant_id: TenantId) -> Vec<&RenewalProposal> {
        let mut proposals: Vec<&RenewalProposal> = self
            .proposals
            .get(&tenant_id)
            .map(|m| m.values().collect())
            .unwrap_or_default();
        proposals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        proposals
    }

    /// The contracts that currently have an open (Pending or Approved)
    /// proposal. Feeds the engine's dedup check.
    pub fn open_proposal_contracts(&self, tenant_id: TenantId) -> HashSet<ContractId> {
        self.proposals
            .get(&tenant_id)
            .map(|m| {
                m.values()
                    .filter(|p| p.state.is_open())
                    .map(|p| p.contract_id)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
