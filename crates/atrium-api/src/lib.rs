//! # atrium-api — Axum API Service
//!
//! The HTTP surface of the Atrium platform, built on Axum/Tower/Tokio.
//! Assembles the domain routers into a single application with shared
//! middleware for authentication and tracing.
//!
//! ## Route Surface
//!
//! - `/v1/services/*` — service catalog CRUD and price quoting
//! - `/v1/requests/*` — service request workflow
//! - `/v1/contracts/*` — contract lifecycle, plus the renewal engine
//!   under `/v1/contracts/rules`, `/v1/contracts/renewals`, and
//!   `/v1/contracts/proposals`
//! - `/v1/compliance/*` — reports, consents, retention, audit trail
//! - `/v1/spaces/*`, `/v1/bookings/*` — workspace inventory and bookings
//! - `/health/*` — liveness and readiness probes (unauthenticated)
//!
//! ## Architecture
//!
//! Request/response types are compile-time contracts via serde derive.
//! Every `/v1` route requires a bearer credential; the auth middleware
//! resolves it to a [`auth::TenantContext`] and handlers never see data
//! outside that tenant.
//!
//! ## Crate Policy
//!
//! - Sits at the top of the dependency DAG — depends on all domain crates.
//! - No business logic in route handlers — delegates to domain crates.
//! - All errors map to structured HTTP responses via `AppError`.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::{ApiKeys, TenantContext};
pub use error::AppError;
pub use routes::app;
pub use state::{AppState, Store};
