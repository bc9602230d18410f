//! # atrium-catalog — Service Catalog & Request Workflow
//!
//! The catalog of billable offerings a coworking operator sells (desks,
//! rooms, add-ons) and the workflow that consumes it.
//!
//! ## Contents
//!
//! - [`service`] — `Service`, `PricingTier`, `ServiceCategory`, and tier
//!   validation (contiguous, non-overlapping, ascending).
//! - [`request`] — the `ServiceRequest` workflow state machine
//!   (Submitted → UnderReview → Approved → InProgress → Completed).
//! - [`registry`] — tenant-scoped in-memory registries for services and
//!   requests, including the recent-request count the demand multiplier
//!   feeds on.
//!
//! ## Crate Policy
//!
//! - Depends only on `atrium-core` internally.
//! - No I/O; registries are plain data structures owned by the caller.

pub mod registry;
pub mod request;
pub mod service;

pub use registry::{CatalogRegistry, RequestRegistry};
pub use request::{
    RequestError, RequestPriority, RequestState, RequestTransitionRecord, ServiceRequest,
};
pub use service::{CatalogError, PricingTier, Service, ServiceCategory};
