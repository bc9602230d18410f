//! # Renewal Proposals
//!
//! A `RenewalProposal` is the engine's output for one eligible contract:
//! the proposed successor term and value, awaiting (or already carrying)
//! approval.
//!
//! ## States
//!
//! ```text
//! Pending ──▶ Approved ──▶ Executed (terminal)
//!    │
//!    └─────▶ Declined (terminal)
//! ```
//!
//! Auto-approved proposals are created directly in Approved.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atrium_core::{ContractId, Money, ProposalId, RuleId, TenantId, Timestamp};

/// The lifecycle state of a renewal proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    /// Awaiting operator decision.
    Pending,
    /// Approved (manually or by rule); awaiting execution.
    Approved,
    /// Declined by the operator (terminal).
    Declined,
    /// Executed — the contract was renewed (terminal).
    Executed,
}

impl ProposalState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Executed)
    }

    /// Whether the proposal still counts as open against its contract.
    ///
    /// Open proposals block the engine from generating another proposal
    /// for the same contract.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl std::fmt::Display for ProposalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Declined => "DECLINED",
            Self::Executed => "EXECUTED",
        };
        f.write_str(s)
    }
}

/// Errors from the proposal lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    /// Attempted transition is not valid from the current state.
    #[error("invalid proposal transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },

    /// No proposal with the given id in the tenant's registry.
    #[error("renewal proposal not found: {0}")]
    NotFound(ProposalId),
}

/// A proposed contract renewal generated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalProposal {
    /// Unique proposal identifier.
    pub id: ProposalId,
    /// The tenant the proposal belongs to.
    pub tenant_id: TenantId,
    /// The contract being renewed.
    pub contract_id: ContractId,
    /// The rule that generated this proposal.
    pub rule_id: RuleId,
    /// Proposed successor term start (the current end of term).
    pub proposed_start: Timestamp,
    /// Proposed successor term end.
    pub proposed_end: Timestamp,
    /// Proposed successor monthly value after the rule's adjustment.
    pub proposed_monthly_value: Money,
    /// Current lifecycle state.
    pub state: ProposalState,
    /// When the proposal was generated.
    pub created_at: Timestamp,
    /// When the proposal was approved/declined/executed, if it has been.
    pub decided_at: Option<Timestamp>,
}

impl RenewalProposal {
    /// Approve a pending proposal (PENDING → APPROVED).
    pub fn approve(&mut self, now: Timestamp) -> Result<(), ProposalError> {
        self.require_state(ProposalState::Pending, ProposalState::Approved)?;
        self.state = ProposalState::Approved;
        self.decided_at = Some(now);
        Ok(())
    }

    /// Decline a pending proposal (PENDING → DECLINED).
    pub fn decline(&mut self, now: Timestamp) -> Result<(), ProposalError> {
        self.require_state(ProposalState::Pending, ProposalState::Declined)?;
        self.state = ProposalState::Declined;
        self.decided_at = Some(now);
        Ok(())
    }

    /// Mark an approved proposal executed (APPROVED → EXECUTED).
    pub fn mark_executed(&mut self, now: Timestamp) -> Result<(), ProposalError> {
        self.require_state(ProposalState::Approved, ProposalState::Executed)?;
        self.state = ProposalState::Executed;
        self.decided_at = Some(now);
        Ok(())
    }

    fn require_state(
        &self,
        expected: ProposalState,
        target: ProposalState,
    ) -> Result<(), ProposalError> {
        if self.state != expected {
            return Err(ProposalError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::Currency;

    fn make_proposal(state: ProposalState) -> RenewalProposal {
        let now = Timestamp::now();
        RenewalProposal {
            id: ProposalId::new(),
            tenant_id: TenantId::new(),
            contract_id: ContractId::new(),
            rule_id: RuleId::new(),
            proposed_start: now.add_days(30),
            proposed_end: now.add_days(395),
            proposed_monthly_value: Money::new(46_350, Currency::Usd),
            state,
            created_at: now,
            decided_at: None,
        }
    }

    #[test]
    fn test_pending_approve_then_execute() {
        let now = Timestamp::now();
        let mut p = make_proposal(ProposalState::Pending);
        p.approve(now).unwrap();
        assert_eq!(p.state, ProposalState::Approved);
        assert_eq!(p.decided_at, Some(now));
        p.mark_executed(now).unwrap();
        assert_eq!(p.state, ProposalState::Executed);
    }

    #[test]
    fn test_pending_decline() {
        let mut p = make_proposal(ProposalState::Pending);
        p.decline(Timestamp::now()).unwrap();
        assert_eq!(p.state, ProposalState::Declined);
        assert!(p.state.is_terminal());
    }

    #[test]
    fn test_cannot_execute_pending() {
        let mut p = make_proposal(ProposalState::Pending);
        assert!(matches!(
            p.mark_executed(Timestamp::now()),
            Err(ProposalError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cannot_decline_approved() {
        let mut p = make_proposal(ProposalState::Approved);
        assert!(matches!(
            p.decline(Timestamp::now()),
            Err(ProposalError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_open_states() {
        assert!(ProposalState::Pending.is_open());
        assert!(ProposalState::Approved.is_open());
        assert!(!ProposalState::Declined.is_open());
        assert!(!ProposalState::Executed.is_open());
    }
}
