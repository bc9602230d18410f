//! # atrium-contracts — Contract Lifecycle & Renewal Engine
//!
//! Membership contracts and the machinery that renews them.
//!
//! ## Contents
//!
//! - [`contract`] — the `Contract` lifecycle state machine
//!   (Draft → Active → Expired | Terminated | Renewed).
//! - [`rules`] — configured `RenewalRule` policies and their eligibility
//!   matching.
//! - [`proposal`] — the `RenewalProposal` lifecycle
//!   (Pending → Approved → Executed, with Declined terminal).
//! - [`engine`] — the renewal run: rule evaluation over expiring
//!   contracts, proposal generation, auto-approval, and notification
//!   fan-out through a [`engine::NotificationSink`].
//! - [`registry`] — tenant-scoped registries for contracts, rules, and
//!   proposals.
//!
//! ## Determinism
//!
//! A renewal run is a pure function of its inputs: rules are evaluated
//! in ascending `days_before_expiry` order (ties broken by name), the
//! first matching rule wins, and a contract with an open proposal is
//! skipped. Running the engine twice over the same state produces no
//! second proposal.

pub mod contract;
pub mod engine;
pub mod proposal;
pub mod registry;
pub mod rules;

pub use contract::{Contract, ContractError, ContractState, ContractTransitionRecord};
pub use engine::{
    InMemorySink, NotificationKind, NotificationSink, RenewalEngine, RenewalNotification,
    RenewalRun, TracingSink,
};
pub use proposal::{ProposalError, ProposalState, RenewalProposal};
pub use registry::ContractRegistry;
pub use rules::{RenewalRule, RuleError};
