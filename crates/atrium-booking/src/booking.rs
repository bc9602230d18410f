//! # Booking Lifecycle State Machine
//!
//! One booking reserves one space for one member over a half-open
//! `[start, end)` window.
//!
//! ## States
//!
//! ```text
//! Pending ──▶ Confirmed ──▶ CheckedIn ──▶ Completed
//!    │            │
//!    │            ├──▶ NoShow           (terminal)
//!    └────────────┴──▶ Cancelled        (terminal)
//! ```
//!
//! Cancellation is only possible before check-in; once a member is in
//! the space the booking runs to Completed. NoShow is recorded from
//! Confirmed when the window passes unused.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atrium_core::{BookingId, MemberId, SpaceId, TenantId, Timestamp};

// ─── Booking State ───────────────────────────────────────────────────

/// The lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
    /// Placed, awaiting confirmation.
    Pending,
    /// Confirmed; the window is held.
    Confirmed,
    /// The member has checked in.
    CheckedIn,
    /// The visit ended (terminal).
    Completed,
    /// Cancelled before check-in (terminal).
    Cancelled,
    /// Confirmed but never checked in (terminal).
    NoShow,
}

impl BookingState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Whether a booking in this state holds its window on the schedule.
    pub fn blocks_schedule(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::NoShow)
    }
}

impl std::fmt::Display for BookingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::CheckedIn => "CHECKED_IN",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::NoShow => "NO_SHOW",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from the booking lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Attempted transition is not valid from the current state.
    #[error("invalid booking transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },

    /// Booking is in a terminal state.
    #[error("booking is in terminal state {state}")]
    TerminalState {
        /// The terminal state.
        state: String,
    },

    /// Window end must be strictly after start.
    #[error("booking window end must be after start")]
    InvertedWindow,

    /// The window overlaps an existing booking for the same space.
    #[error("booking window conflicts with booking {0}")]
    Conflict(BookingId),

    /// The space cannot take new bookings.
    #[error("space {0} is inactive")]
    InactiveSpace(SpaceId),

    /// No booking with the given id in the tenant's schedule.
    #[error("booking not found: {0}")]
    NotFound(BookingId),
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a booking lifecycle transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingTransitionRecord {
    /// State before the transition.
    pub from_state: BookingState,
    /// State after the transition.
    pub to_state: BookingState,
    /// When the transition occurred.
    pub timestamp: Timestamp,
    /// Reason for the transition.
    pub reason: String,
}

// ─── Booking ─────────────────────────────────────────────────────────

/// A reservation of one space over a half-open `[start, end)` window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// The tenant the booking belongs to.
    pub tenant_id: TenantId,
    /// The reserved space.
    pub space_id: SpaceId,
    /// The booking member.
    pub member_id: MemberId,
    /// Window start (inclusive).
    pub start: Timestamp,
    /// Window end (exclusive).
    pub end: Timestamp,
    /// Current lifecycle state.
    pub state: BookingState,
    /// When the booking was placed.
    pub created_at: Timestamp,
    /// Ordered log of all lifecycle transitions.
    pub transitions: Vec<BookingTransitionRecord>,
}

impl Booking {
    /// Place a new booking in the Pending state.
    pub fn new(
        tenant_id: TenantId,
        space_id: SpaceId,
        member_id: MemberId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Self, BookingError> {
        if end <= start {
            return Err(BookingError::InvertedWindow);
        }
        Ok(Self {
            id: BookingId::new(),
            tenant_id,
            space_id,
            member_id,
            start,
            end,
            state: BookingState::Pending,
            created_at: Timestamp::now(),
            transitions: Vec::new(),
        })
    }

    /// Whether this booking's window overlaps `[start, end)`.
    ///
    /// Half-open windows: a booking ending exactly when another starts
    /// does not overlap it.
    pub fn overlaps(&self, start: Timestamp, end: Timestamp) -> bool {
        self.start < end && start < self.end
    }

    /// Confirm the booking (PENDING → CONFIRMED).
    pub fn confirm(&mut self, reason: &str) -> Result<(), BookingError> {
        self.require_state(&[BookingState::Pending], BookingState::Confirmed)?;
        self.do_transition(BookingState::Confirmed, reason);
        Ok(())
    }

    /// Check the member in (CONFIRMED → CHECKED_IN).
    pub fn check_in(&mut self, reason: &str) -> Result<(), BookingError> {
        self.require_state(&[BookingState::Confirmed], BookingState::CheckedIn)?;
        self.do_transition(BookingState::CheckedIn, reason);
        Ok(())
    }

    /// End the visit (CHECKED_IN → COMPLETED).
    pub fn complete(&mut self, reason: &str) -> Result<(), BookingError> {
        self.require_state(&[BookingState::CheckedIn], BookingState::Completed)?;
        self.do_transition(BookingState::Completed, reason);
        Ok(())
    }

    /// Cancel before check-in (PENDING | CONFIRMED → CANCELLED).
    pub fn cancel(&mut self, reason: &str) -> Result<(), BookingError> {
        self.require_state(
            &[BookingState::Pending, BookingState::Confirmed],
            BookingState::Cancelled,
        )?;
        self.do_transition(BookingState::Cancelled, reason);
        Ok(())
    }

    /// Record a no-show (CONFIRMED → NO_SHOW).
    pub fn mark_no_show(&mut self, reason: &str) -> Result<(), BookingError> {
        self.require_state(&[BookingState::Confirmed], BookingState::NoShow)?;
        self.do_transition(BookingState::NoShow, reason);
        Ok(())
    }

    /// Validate that the booking is in one of the expected states.
    fn require_state(
        &self,
        expected: &[BookingState],
        target: BookingState,
    ) -> Result<(), BookingError> {
        if self.state.is_terminal() {
            return Err(BookingError::TerminalState {
                state: self.state.to_string(),
            });
        }
        if !expected.contains(&self.state) {
            return Err(BookingError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }

    /// Record a lifecycle transition.
    fn do_transition(&mut self, to: BookingState, reason: &str) {
        self.transitions.push(BookingTransitionRecord {
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

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn make_booking() -> Booking {
        Booking::new(
            TenantId::new(),
            SpaceId::new(),
            MemberId::new(),
            ts("2026-07-01T09:00:00Z"),
            ts("2026-07-01T11:00:00Z"),
        )
        .unwrap()
    }

    // ── window validation ──

    #[test]
    fn test_inverted_window_rejected() {
        let err = Booking::new(
            TenantId::new(),
            SpaceId::new(),
            MemberId::new(),
            ts("2026-07-01T11:00:00Z"),
            ts("2026-07-01T09:00:00Z"),
        )
        .unwrap_err();
        assert_eq!(err, BookingError::InvertedWindow);
    }

    #[test]
    fn test_empty_window_rejected() {
        let err = Booking::new(
            TenantId::new(),
            SpaceId::new(),
            MemberId::new(),
            ts("2026-07-01T09:00:00Z"),
            ts("2026-07-01T09:00:00Z"),
        )
        .unwrap_err();
        assert_eq!(err, BookingError::InvertedWindow);
    }

    // ── overlap semantics ──

    #[test]
    fn test_back_to_back_windows_do_not_overlap() {
        let booking = make_booking();
        assert!(!booking.overlaps(ts("2026-07-01T11:00:00Z"), ts("2026-07-01T12:00:00Z")));
        assert!(!booking.overlaps(ts("2026-07-01T08:00:00Z"), ts("2026-07-01T09:00:00Z")));
    }

    #[test]
    fn test_contained_and_straddling_windows_overlap() {
        let booking = make_booking();
        assert!(booking.overlaps(ts("2026-07-01T09:30:00Z"), ts("2026-07-01T10:00:00Z")));
        assert!(booking.overlaps(ts("2026-07-01T08:00:00Z"), ts("2026-07-01T12:00:00Z")));
        assert!(booking.overlaps(ts("2026-07-01T10:59:00Z"), ts("2026-07-01T13:00:00Z")));
    }

    // ── lifecycle ──

    #[test]
    fn test_happy_path_to_completed() {
        let mut booking = make_booking();
        booking.confirm("payment ok").unwrap();
        booking.check_in("front desk").unwrap();
        booking.complete("visit ended").unwrap();
        assert_eq!(booking.state, BookingState::Completed);
        assert_eq!(booking.transitions.len(), 3);
        assert_eq!(booking.transitions[0].from_state, BookingState::Pending);
    }

    #[test]
    fn test_cannot_check_in_from_pending() {
        let mut booking = make_booking();
        assert!(matches!(
            booking.check_in("too early").unwrap_err(),
            BookingError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn test_cancel_before_check_in_only() {
        let mut booking = make_booking();
        booking.cancel("member request").unwrap();
        assert_eq!(booking.state, BookingState::Cancelled);

        let mut checked_in = make_booking();
        checked_in.confirm("ok").unwrap();
        checked_in.check_in("front desk").unwrap();
        assert!(matches!(
            checked_in.cancel("too late").unwrap_err(),
            BookingError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn test_no_show_only_from_confirmed() {
        let mut booking = make_booking();
        assert!(booking.mark_no_show("window passed").is_err());
        booking.confirm("ok").unwrap();
        booking.mark_no_show("window passed").unwrap();
        assert_eq!(booking.state, BookingState::NoShow);
    }

    #[test]
    fn test_terminal_state_locks_booking() {
        let mut booking = make_booking();
        booking.cancel("member request").unwrap();
        assert!(matches!(
            booking.confirm("retry").unwrap_err(),
            BookingError::TerminalState { .. }
        ));
    }

    #[test]
    fn test_blocks_schedule() {
        assert!(BookingState::Pending.blocks_schedule());
        assert!(BookingState::Confirmed.blocks_schedule());
        assert!(BookingState::CheckedIn.blocks_schedule());
        assert!(BookingState::Completed.blocks_schedule());
        assert!(!BookingState::Cancelled.blocks_schedule());
        assert!(!BookingState::NoShow.blocks_schedule());
    }
}
