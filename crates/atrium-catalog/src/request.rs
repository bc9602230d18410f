//! # Service Request Workflow State Machine
//!
//! Models the lifecycle of a member's request for a catalog service,
//! from submission through fulfilment.
//!
//! ## States
//!
//! ```text
//! Submitted ──▶ UnderReview ──▶ Approved ──▶ InProgress ──▶ Completed
//!     │              │
//!     └──▶ Rejected  └──▶ Rejected        (terminal)
//!
//! Cancelled is reachable from any non-terminal state.
//! ```
//!
//! Transitions are validated at runtime and recorded with a reason, so a
//! request carries its full workflow history.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use atrium_core::{MemberId, RequestId, ServiceId, TenantId, Timestamp};

// ─── Priority ────────────────────────────────────────────────────────

/// Fulfilment priority of a service request. Feeds the priority
/// multiplier in the pricing chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPriority {
    /// Flexible timing; priced below standard.
    Low,
    /// Default priority.
    Standard,
    /// Expedited handling.
    High,
    /// Immediate handling.
    Urgent,
}

impl RequestPriority {
    /// The wire identifier for this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Standard => "standard",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for RequestPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestPriority {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "standard" => Ok(Self::Standard),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(RequestError::UnknownPriority(other.to_string())),
        }
    }
}

// ─── Request State ───────────────────────────────────────────────────

/// The workflow state of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Submitted by a member, awaiting triage.
    Submitted,
    /// Under operator review.
    UnderReview,
    /// Approved; awaiting fulfilment.
    Approved,
    /// Fulfilment in progress.
    InProgress,
    /// Fulfilled (terminal).
    Completed,
    /// Rejected during triage or review (terminal).
    Rejected,
    /// Cancelled by the member or operator (terminal).
    Cancelled,
}

impl RequestState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Submitted => "SUBMITTED",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Approved => "APPROVED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from the request workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Attempted transition is not valid from the current state.
    #[error("invalid request transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },

    /// Request is in a terminal state.
    #[error("request is in terminal state {state}")]
    TerminalState {
        /// The terminal state.
        state: String,
    },

    /// Quantity must be at least 1.
    #[error("request quantity must be at least 1")]
    ZeroQuantity,

    /// Unrecognized priority identifier.
    #[error("unknown request priority: {0}")]
    UnknownPriority(String),

    /// No request with the given id in the tenant's registry.
    #[error("request not found: {0}")]
    NotFound(RequestId),
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a request workflow transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTransitionRecord {
    /// State before the transition.
    pub from_state: RequestState,
    /// State after the transition.
    pub to_state: RequestState,
    /// When the transition occurred.
    pub timestamp: Timestamp,
    /// Reason for the transition.
    pub reason: String,
}

// ─── Service Request ─────────────────────────────────────────────────

/// A member's request for a catalog service, with workflow history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    /// Unique request identifier.
    pub id: RequestId,
    /// The tenant the request belongs to.
    pub tenant_id: TenantId,
    /// The requested service.
    pub service_id: ServiceId,
    /// The requesting member.
    pub member_id: MemberId,
    /// Requested quantity of the service's billing unit.
    pub quantity: u32,
    /// Fulfilment priority.
    pub priority: RequestPriority,
    /// When the member needs the service delivered.
    pub needed_by: Timestamp,
    /// Current workflow state.
    pub state: RequestState,
    /// When the request was submitted.
    pub created_at: Timestamp,
    /// Ordered log of all workflow transitions.
    pub transitions: Vec<RequestTransitionRecord>,
}

impl ServiceRequest {
    /// Create a new request in the Submitted state.
    pub fn new(
        tenant_id: TenantId,
        service_id: ServiceId,
        member_id: MemberId,
        quantity: u32,
        priority: RequestPriority,
        needed_by: Timestamp,
    ) -> Result<Self, RequestError> {
        if quantity == 0 {
            return Err(RequestError::ZeroQuantity);
        }
        Ok(Self {
            id: RequestId::new(),
            tenant_id,
            service_id,
            member_id,
            quantity,
            priority,
            needed_by,
            state: RequestState::Submitted,
            created_at: Timestamp::now(),
            transitions: Vec::new(),
        })
    }

    /// Move the request into review (SUBMITTED → UNDER_REVIEW).
    pub fn begin_review(&mut self, reason: &str) -> Result<(), RequestError> {
        self.require_state(&[RequestState::Submitted], RequestState::UnderReview)?;
        self.do_transition(RequestState::UnderReview, reason);
        Ok(())
    }

    /// Approve the request (SUBMITTED | UNDER_REVIEW → APPROVED).
    pub fn approve(&mut self, reason: &str) -> Result<(), RequestError> {
        self.require_state(
            &[RequestState::Submitted, RequestState::UnderReview],
            RequestState::Approved,
        )?;
        self.do_transition(RequestState::Approved, reason);
        Ok(())
    }

    /// Start fulfilment (APPROVED → IN_PROGRESS).
    pub fn start_fulfilment(&mut self, reason: &str) -> Result<(), RequestError> {
        self.require_state(&[RequestState::Approved], RequestState::InProgress)?;
        self.do_transition(RequestState::InProgress, reason);
        Ok(())
    }

    /// Complete fulfilment (IN_PROGRESS → COMPLETED).
    pub fn complete(&mut self, reason: &str) -> Result<(), RequestError> {
        self.require_state(&[RequestState::InProgress], RequestState::Completed)?;
        self.do_transition(RequestState::Completed, reason);
        Ok(())
    }

    /// Reject the request (SUBMITTED | UNDER_REVIEW → REJECTED).
    pub fn reject(&mut self, reason: &str) -> Result<(), RequestError> {
        self.require_state(
            &[RequestState::Submitted, RequestState::UnderReview],
            RequestState::Rejected,
        )?;
        self.do_transition(RequestState::Rejected, reason);
        Ok(())
    }

    /// Cancel the request from any non-terminal state.
    pub fn cancel(&mut self, reason: &str) -> Result<(), RequestError> {
        if self.state.is_terminal() {
            return Err(RequestError::TerminalState {
                state: self.state.to_string(),
            });
        }
        self.do_transition(RequestState::Cancelled, reason);
        Ok(())
    }

    /// Validate that the request is in one of the expected states.
    fn require_state(
        &self,
        expected: &[RequestState],
        target: RequestState,
    ) -> Result<(), RequestError> {
        if self.state.is_terminal() {
            return Err(RequestError::TerminalState {
                state: self.state.to_string(),
            });
        }
        if !expected.contains(&self.state) {
            return Err(RequestError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }

    /// Record a workflow transition.
    fn do_transition(&mut self, to: RequestState, reason: &str) {
        self.transitions.push(RequestTransitionRecord {
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

    fn make_request() -> ServiceRequest {
        ServiceRequest::new(
            TenantId::new(),
            ServiceId::new(),
            MemberId::new(),
            4,
            RequestPriority::Standard,
            Timestamp::now().add_days(7),
        )
        .unwrap()
    }

    // ── Basic workflow ───────────────────────────────────────────────

    #[test]
    fn test_new_request_is_submitted() {
        let r = make_request();
        assert_eq!(r.state, RequestState::Submitted);
        assert!(r.transitions.is_empty());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = ServiceRequest::new(
            TenantId::new(),
            ServiceId::new(),
            MemberId::new(),
            0,
            RequestPriority::Low,
            Timestamp::now(),
        );
        assert_eq!(result.unwrap_err(), RequestError::ZeroQuantity);
    }

    #[test]
    fn test_full_happy_path() {
        let mut r = make_request();
        r.begin_review("triage").unwrap();
        r.approve("capacity available").unwrap();
        r.start_fulfilment("assigned").unwrap();
        r.complete("delivered").unwrap();
        assert_eq!(r.state, RequestState::Completed);
        assert_eq!(r.transitions.len(), 4);
    }

    #[test]
    fn test_direct_approval_from_submitted() {
        let mut r = make_request();
        r.approve("auto-approved").unwrap();
        assert_eq!(r.state, RequestState::Approved);
    }

    // ── Rejection & cancellation ─────────────────────────────────────

    #[test]
    fn test_reject_from_review() {
        let mut r = make_request();
        r.begin_review("triage").unwrap();
        r.reject("no capacity").unwrap();
        assert_eq!(r.state, RequestState::Rejected);
    }

    #[test]
    fn test_cannot_reject_after_approval() {
        let mut r = make_request();
        r.approve("ok").unwrap();
        assert!(matches!(
            r.reject("too late"),
            Err(RequestError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cancel_from_in_progress() {
        let mut r = make_request();
        r.approve("ok").unwrap();
        r.start_fulfilment("go").unwrap();
        r.cancel("member withdrew").unwrap();
        assert_eq!(r.state, RequestState::Cancelled);
    }

    #[test]
    fn test_cancel_from_terminal_fails() {
        let mut r = make_request();
        r.cancel("withdrawn").unwrap();
        assert!(matches!(
            r.cancel("again"),
            Err(RequestError::TerminalState { .. })
        ));
    }

    #[test]
    fn test_terminal_rejects_all_transitions() {
        let mut r = make_request();
        r.approve("ok").unwrap();
        r.start_fulfilment("go").unwrap();
        r.complete("done").unwrap();

        assert!(r.begin_review("x").is_err());
        assert!(r.approve("x").is_err());
        assert!(r.start_fulfilment("x").is_err());
        assert!(r.complete("x").is_err());
        assert!(r.cancel("x").is_err());
    }

    // ── Transition log ───────────────────────────────────────────────

    #[test]
    fn test_transition_log_records_all_changes() {
        let mut r = make_request();
        r.begin_review("triage").unwrap();
        r.approve("ok").unwrap();

        assert_eq!(r.transitions.len(), 2);
        assert_eq!(r.transitions[0].from_state, RequestState::Submitted);
        assert_eq!(r.transitions[0].to_state, RequestState::UnderReview);
        assert_eq!(r.transitions[1].from_state, RequestState::UnderReview);
        assert_eq!(r.transitions[1].to_state, RequestState::Approved);
        assert_eq!(r.transitions[1].reason, "ok");
    }

    // ── Priority parsing ─────────────────────────────────────────────

    #[test]
    fn test_priority_roundtrip() {
        for p in [
            RequestPriority::Low,
            RequestPriority::Standard,
            RequestPriority::High,
            RequestPriority::Urgent,
        ] {
            assert_eq!(p.as_str().parse::<RequestPriority>().unwrap(), p);
        }
        assert!("whenever".parse::<RequestPriority>().is_err());
    }
}
