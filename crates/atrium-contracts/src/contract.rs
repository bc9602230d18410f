//! # Contract Lifecycle State Machine
//!
//! Models the lifecycle of a membership contract between a tenant and a
//! member.
//!
//! ## States
//!
//! ```text
//! Draft ──▶ Active ──▶ Expired    (terminal)
//!   │          ├─────▶ Terminated (terminal)
//!   │          └─────▶ Renewed    (terminal; a successor contract exists)
//!   └─────▶ Cancelled (terminal)
//! ```
//!
//! Transitions are validated at runtime and recorded with a reason.
//! Terminal states reject all further transitions with structured errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atrium_catalog::ServiceCategory;
use atrium_core::{ContractId, MemberId, Money, TenantId, Timestamp};

// ─── Contract State ──────────────────────────────────────────────────

/// The lifecycle state of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractState {
    /// Drafted but not yet in force.
    Draft,
    /// In force.
    Active,
    /// Reached its end date without renewal (terminal).
    Expired,
    /// Ended early by either party (terminal).
    Terminated,
    /// Superseded by a renewal contract (terminal).
    Renewed,
    /// Draft abandoned before activation (terminal).
    Cancelled,
}

impl ContractState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Expired | Self::Terminated | Self::Renewed | Self::Cancelled
        )
    }
}

impl std::fmt::Display for ContractState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
            Self::Terminated => "TERMINATED",
            Self::Renewed => "RENEWED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from the contract lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Attempted transition is not valid from the current state.
    #[error("invalid contract transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },

    /// Contract is in a terminal state.
    #[error("contract {contract_id} is in terminal state {state}")]
    TerminalState {
        /// The contract identifier.
        contract_id: String,
        /// The terminal state.
        state: String,
    },

    /// End date must be after the start date.
    #[error("contract end date {end} is not after start date {start}")]
    InvertedTerm {
        /// Start of term.
        start: String,
        /// End of term.
        end: String,
    },

    /// No contract with the given id in the tenant's registry.
    #[error("contract not found: {0}")]
    NotFound(ContractId),
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a contract lifecycle transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTransitionRecord {
    /// State before the transition.
    pub from_state: ContractState,
    /// State after the transition.
    pub to_state: ContractState,
    /// When the transition occurred.
    pub timestamp: Timestamp,
    /// Reason for the transition.
    pub reason: String,
}

// ─── Contract ────────────────────────────────────────────────────────

/// A membership contract with its lifecycle state and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Unique contract identifier.
    pub id: ContractId,
    /// The tenant that owns this contract.
    pub tenant_id: TenantId,
    /// The member party to the contract.
    pub member_id: MemberId,
    /// Display title (e.g., "12-month dedicated desk").
    pub title: String,
    /// The service category the contract covers, when it maps to one.
    /// Category-scoped renewal rules only match categorized contracts.
    pub category: Option<ServiceCategory>,
    /// Recurring monthly value.
    pub monthly_value: Money,
    /// Start of term.
    pub start_date: Timestamp,
    /// End of term.
    pub end_date: Timestamp,
    /// Whether the member opted into automatic renewal.
    pub auto_renew: bool,
    /// Current lifecycle state.
    pub state: ContractState,
    /// When the contract row was created.
    pub created_at: Timestamp,
    /// Ordered log of all lifecycle transitions.
    pub transitions: Vec<ContractTransitionRecord>,
}

impl Contract {
    /// Create a new contract in the Draft state.
    ///
    /// # Errors
    ///
    /// Rejects terms whose end date is not after the start date.
    pub fn new(
        tenant_id: TenantId,
        member_id: MemberId,
        title: impl Into<String>,
        category: Option<ServiceCategory>,
        monthly_value: Money,
        start_date: Timestamp,
        end_date: Timestamp,
        auto_renew: bool,
    ) -> Result<Self, ContractError> {
        if end_date <= start_date {
            return Err(ContractError::InvertedTerm {
                start: start_date.to_string(),
                end: end_date.to_string(),
            });
        }
        Ok(Self {
            id: ContractId::new(),
            tenant_id,
            member_id,
            title: title.into(),
            category,
            monthly_value,
            start_date,
            end_date,
            auto_renew,
            state: ContractState::Draft,
            created_at: Timestamp::now(),
            transitions: Vec::new(),
        })
    }

    /// Bring the contract into force (DRAFT → ACTIVE).
    pub fn activate(&mut self, reason: &str) -> Result<(), ContractError> {
        self.require_state(ContractState::Draft, ContractState::Active)?;
        self.do_transition(ContractState::Active, reason);
        Ok(())
    }

    /// Abandon a draft (DRAFT → CANCELLED).
    pub fn cancel(&mut self, reason: &str) -> Result<(), ContractError> {
        self.require_state(ContractState::Draft, ContractState::Cancelled)?;
        self.do_transition(ContractState::Cancelled, reason);
        Ok(())
    }

    /// Expire at end of term (ACTIVE → EXPIRED).
    pub fn expire(&mut self, reason: &str) -> Result<(), ContractError> {
        self.require_state(ContractState::Active, ContractState::Expired)?;
        self.do_transition(ContractState::Expired, reason);
        Ok(())
    }

    /// End the contract early (ACTIVE → TERMINATED).
    pub fn terminate(&mut self, reason: &str) -> Result<(), ContractError> {
        self.require_state(ContractState::Active, ContractState::Terminated)?;
        self.do_transition(ContractState::Terminated, reason);
        Ok(())
    }

    /// Mark the contract as superseded by a renewal (ACTIVE → RENEWED).
    ///
    /// Called by the renewal engine when an approved proposal executes;
    /// the successor contract is created alongside.
    pub fn mark_renewed(&mut self, reason: &str) -> Result<(), ContractError> {
        self.require_state(ContractState::Active, ContractState::Renewed)?;
        self.do_transition(ContractState::Renewed, reason);
        Ok(())
    }

    /// Whole days from `now` until the end of term (negative if past).
    pub fn days_until_expiry(&self, now: Timestamp) -> i64 {
        now.days_until(self.end_date)
    }

    /// Validate that the contract is in the expected state.
    fn require_state(
        &self,
        expected: ContractState,
        target: ContractState,
    ) -> Result<(), ContractError> {
        if self.state.is_terminal() {
            return Err(ContractError::TerminalState {
                contract_id: self.id.to_string(),
                state: self.state.to_string(),
            });
        }
        if self.state != expected {
            return Err(ContractError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }

    /// Record a lifecycle transition.
    fn do_transition(&mut self, to: ContractState, reason: &str) {
        self.transitions.push(ContractTransitionRecord {
            from_state: self.state,
            to_state: to,
            timestamp: Timestamp::now(),
            reason: reason.to_string(),
        });
        self.state = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::Currency;

    fn make_contract() -> Contract {
        let now = Timestamp::now();
        Contract::new(
            TenantId::new(),
            MemberId::new(),
            "12-month dedicated desk",
            Some(ServiceCategory::Desk),
            Money::new(45_000, Currency::Usd),
            now,
            now.add_days(365),
            true,
        )
        .unwrap()
    }

    fn make_active_contract() -> Contract {
        let mut c = make_contract();
        c.activate("signed").unwrap();
        c
    }

    // ── Basic lifecycle ──────────────────────────────────────────────

    #[test]
    fn test_new_contract_is_draft() {
        let c = make_contract();
        assert_eq!(c.state, ContractState::Draft);
        assert!(c.transitions.is_empty());
    }

    #[test]
    fn test_inverted_term_rejected() {
        let now = Timestamp::now();
        let result = Contract::new(
            TenantId::new(),
            MemberId::new(),
            "backwards",
            None,
            Money::new(1_000, Currency::Usd),
            now,
            now,
            false,
        );
        assert!(matches!(result, Err(ContractError::InvertedTerm { .. })));
    }

    #[test]
    fn test_draft_to_active() {
        let c = make_active_contract();
        assert_eq!(c.state, ContractState::Active);
        assert_eq!(c.transitions.len(), 1);
    }

    #[test]
    fn test_draft_cancellation() {
        let mut c = make_contract();
        c.cancel("member withdrew").unwrap();
        assert_eq!(c.state, ContractState::Cancelled);
    }

    #[test]
    fn test_active_to_expired() {
        let mut c = make_active_contract();
        c.expire("end of term").unwrap();
        assert_eq!(c.state, ContractState::Expired);
    }

    #[test]
    fn test_active_to_terminated() {
        let mut c = make_active_contract();
        c.terminate("breach").unwrap();
        assert_eq!(c.state, ContractState::Terminated);
    }

    #[test]
    fn test_active_to_renewed() {
        let mut c = make_active_contract();
        c.mark_renewed("proposal executed").unwrap();
        assert_eq!(c.state, ContractState::Renewed);
    }

    // ── Invalid transitions ──────────────────────────────────────────

    #[test]
    fn test_cannot_expire_draft() {
        let mut c = make_contract();
        assert!(matches!(
            c.expire("too early"),
            Err(ContractError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cannot_cancel_active() {
        let mut c = make_active_contract();
        assert!(matches!(
            c.cancel("too late"),
            Err(ContractError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_terminal_rejects_all_transitions() {
        let mut c = make_active_contract();
        c.expire("end of term").unwrap();
        match c.activate("no") {
            Err(ContractError::TerminalState { state, .. }) => assert_eq!(state, "EXPIRED"),
            other => panic!("expected TerminalState, got: {other:?}"),
        }
    }

    // ── Expiry window ────────────────────────────────────────────────

    #[test]
    fn test_days_until_expiry() {
        let start = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let c = Contract::new(
            TenantId::new(),
            MemberId::new(),
            "term",
            None,
            Money::new(1_000, Currency::Usd),
            start,
            start.add_days(365),
            false,
        )
        .unwrap();
        assert_eq!(c.days_until_expiry(start), 365);
        assert_eq!(c.days_until_expiry(start.add_days(350)), 15);
        assert!(c.days_until_expiry(start.add_days(400)) < 0);
    }

    // ── Transition log ───────────────────────────────────────────────

    #[test]
    fn test_transition_log_records_all_changes() {
        let mut c = make_active_contract();
        c.mark_renewed("renewed").unwrap();
        assert_eq!(c.transitions.len(), 2);
        assert_eq!(c.transitions[0].from_state, ContractState::Draft);
        assert_eq!(c.transitions[0].to_state, ContractState::Active);
        assert_eq!(c.transitions[1].from_state, ContractState::Active);
        assert_eq!(c.transitions[1].to_state, ContractState::Renewed);
    }

    #[test]
    fn test_serde_roundtrip() {
        let c = make_active_contract();
        let json = serde_json::to_string(&c).unwrap();
        let parsed: Contract = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }
}
