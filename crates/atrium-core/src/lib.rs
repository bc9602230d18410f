//! # atrium-core — Foundational Types for the Atrium Platform
//!
//! This crate is the bedrock of the Atrium coworking platform. It defines
//! the type-system primitives every other crate builds on. Every other
//! crate in the workspace depends on `atrium-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `TenantId`, `ServiceId`,
//!    `ContractId`, `BookingId` and friends — all newtypes over `Uuid`.
//!    No bare strings or raw UUIDs for identifiers, so a `SpaceId` can
//!    never be passed where a `ServiceId` is expected.
//!
//! 2. **Integer money.** `Money` stores minor units (cents) as `i64` with
//!    a currency tag. Floats never enter monetary arithmetic; multiplier
//!    math happens in basis points with round-half-up at the end.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision. Non-UTC inputs are rejected at
//!    construction on the strict path.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `atrium-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod money;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use identity::{
    BookingId, ConsentId, ContractId, MemberId, PolicyId, ProposalId, ReportId, RequestId, RuleId,
    ServiceId, SpaceId, TenantId,
};
pub use money::{Currency, Money, MoneyError};
pub use temporal::Timestamp;
