//! # atrium-cli — Atrium Command-Line Interface
//!
//! Operational entry points for the platform.
//!
//! ## Subcommands
//!
//! - `serve` — run the HTTP API server
//! - `quote` — price an ad-hoc quote offline, no server needed
//! - `report` — generate a compliance report from a snapshot file
//! - `validate` — check a service definition against catalog invariants
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to domain crates — no business logic here.

pub mod quote;
pub mod report;
pub mod serve;
pub mod validate;
