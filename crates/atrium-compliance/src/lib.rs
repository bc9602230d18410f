//! # atrium-compliance — Reporting, Consent, Retention, Audit
//!
//! The compliance surface of the platform.
//!
//! ## Contents
//!
//! - [`framework`] — the `ComplianceFramework` enum (SOX, GDPR, HIPAA,
//!   PCI-DSS); one definition, exhaustive `match` everywhere.
//! - [`report`] — per-control report generation over a
//!   [`report::ComplianceSnapshot`] aggregated by the caller. The
//!   generator itself does no I/O.
//! - [`consent`] — the GDPR consent ledger. Withdrawal annotates,
//!   never deletes; current state per (member, purpose) is the latest
//!   record.
//! - [`retention`] — data-retention policies and purge-candidate
//!   evaluation. The engine reports; it does not delete.
//! - [`audit`] — append-only, sha256 hash-chained audit trail with
//!   whole-chain verification.

pub mod audit;
pub mod consent;
pub mod framework;
pub mod report;
pub mod retention;

pub use audit::{AuditError, AuditEvent, AuditTrail};
pub use consent::{ConsentError, ConsentLedger, ConsentPurpose, ConsentRecord};
pub use framework::ComplianceFramework;
pub use report::{
    generate_report, ComplianceReport, ComplianceSnapshot, ControlFinding, ControlStatus,
    ReportingPeriod,
};
pub use retention::{
    PurgeCandidate, PurgeReport, RecordKind, RecordStamp, RetentionError, RetentionPolicy,
    RetentionPolicySet,
};
