//! # Compliance Report Generation
//!
//! Evaluates per-framework controls over a [`ComplianceSnapshot`] the
//! caller aggregates from the live stores. The generator is pure: it
//! reads the snapshot, renders findings, and never touches storage, so
//! every control is unit-testable with a hand-built snapshot.
//!
//! A report is Deficient overall if any control is Deficient.
//! NotApplicable controls (no data to judge) never fail a report.

use serde::{Deserialize, Serialize};

use atrium_core::{ReportId, TenantId, Timestamp};

use crate::framework::ComplianceFramework;
use crate::retention::RecordKind;

/// The verdict for one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    /// Evidence supports the control.
    Satisfied,
    /// Evidence contradicts the control.
    Deficient,
    /// No data exists to judge the control.
    NotApplicable,
}

/// One evaluated control within a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFinding {
    /// Stable control identifier (e.g., "SOX-1").
    pub control_id: String,
    /// Human-readable control title.
    pub title: String,
    /// The verdict.
    pub status: ControlStatus,
    /// The evidence the verdict rests on.
    pub evidence: String,
}

impl ControlFinding {
    fn new(
        control_id: &str,
        title: &str,
        status: ControlStatus,
        evidence: impl Into<String>,
    ) -> Self {
        Self {
            control_id: control_id.to_string(),
            title: title.to_string(),
            status,
            evidence: evidence.into(),
        }
    }
}

/// The window of platform activity a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    /// Start of the covered window (inclusive).
    pub start: Timestamp,
    /// End of the covered window (exclusive).
    pub end: Timestamp,
}

impl ReportingPeriod {
    /// The period ending at `end` and reaching back `days` whole days.
    pub fn trailing_days(end: Timestamp, days: i64) -> Self {
        Self {
            start: end.add_days(-days),
            end,
        }
    }
}

/// Point-in-time evidence aggregated by the caller.
///
/// Counts are tenant-scoped and cover the reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSnapshot {
    /// Contracts that reached Active state.
    pub contracts_activated: usize,
    /// Activated contracts whose activation carries approval evidence.
    pub contracts_with_approval: usize,
    /// Events in the tenant's audit chain.
    pub audit_events: usize,
    /// Whether chain verification succeeded from genesis.
    pub audit_chain_intact: bool,
    /// Members that appear in the consent ledger.
    pub members_seen: usize,
    /// Members with a current, effective essential-processing consent.
    pub members_with_essential_consent: usize,
    /// Record kinds covered by an enabled retention policy.
    pub retention_kinds_covered: usize,
    /// Purge candidates past their retention bound.
    pub overdue_purge_candidates: usize,
    /// Whether every non-health route requires authentication.
    pub all_routes_authenticated: bool,
    /// Whether any store holds payment-card data.
    pub stores_payment_card_data: bool,
}

/// A generated compliance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Unique report identifier.
    pub id: ReportId,
    /// The tenant reported on.
    pub tenant_id: TenantId,
    /// The framework evaluated.
    pub framework: ComplianceFramework,
    /// The activity window the report covers.
    pub period: ReportingPeriod,
    /// When the report was generated.
    pub generated_at: Timestamp,
    /// Per-control findings, in control-id order.
    pub findings: Vec<ControlFinding>,
    /// Deficient if any finding is Deficient, else Satisfied.
    pub overall: ControlStatus,
}

/// Generate a report for one framework from a snapshot.
pub fn generate_report(
    tenant_id: TenantId,
    framework: ComplianceFramework,
    period: ReportingPeriod,
    snapshot: &ComplianceSnapshot,
    generated_at: Timestamp,
) -> ComplianceReport {
    let findings = match framework {
        ComplianceFramework::Sox => sox_findings(snapshot),
        ComplianceFramework::Gdpr => gdpr_findings(snapshot),
        ComplianceFramework::Hipaa => hipaa_findings(snapshot),
        ComplianceFramework::PciDss => pci_findings(snapshot),
    };
    let overall = if findings.iter().any(|f| f.status == ControlStatus::Deficient) {
        ControlStatus::Deficient
    } else {
        ControlStatus::Satisfied
    };
    ComplianceReport {
        id: ReportId::new(),
        tenant_id,
        framework,
        period,
        generated_at,
        findings,
        overall,
    }
}

fn chain_finding(control_id: &str, snapshot: &ComplianceSnapshot) -> ControlFinding {
    let status = if snapshot.audit_chain_intact {
        ControlStatus::Satisfied
    } else {
        ControlStatus::Deficient
    };
    ControlFinding::new(
        control_id,
        "Audit trail is tamper-evident and intact",
        status,
        format!(
            "chain verification over {} event(s): {}",
            snapshot.audit_events,
            if snapshot.audit_chain_intact { "intact" } else { "BROKEN" }
        ),
    )
}

fn sox_findings(snapshot: &ComplianceSnapshot) -> Vec<ControlFinding> {
    let approval = if snapshot.contracts_activated == 0 {
        ControlFinding::new(
            "SOX-1",
            "Contract activation requires approval",
            ControlStatus::NotApplicable,
            "no contracts activated in period",
        )
    } else if snapshot.contracts_with_approval == snapshot.contracts_activated {
        ControlFinding::new(
            "SOX-1",
            "Contract activation requires approval",
            ControlStatus::Satisfied,
            format!(
                "{}/{} activated contracts carry approval evidence",
                snapshot.contracts_with_approval, snapshot.contracts_activated
            ),
        )
    } else {
        ControlFinding::new(
            "SOX-1",
            "Contract activation requires approval",
            ControlStatus::Deficient,
            format!(
                "{}/{} activated contracts carry approval evidence",
                snapshot.contracts_with_approval, snapshot.contracts_activated
            ),
        )
    };

    let recorded = if snapshot.audit_events == 0 {
        ControlFinding::new(
            "SOX-3",
            "Financially relevant actions are recorded",
            ControlStatus::NotApplicable,
            "no audited actions in period",
        )
    } else {
        ControlFinding::new(
            "SOX-3",
            "Financially relevant actions are recorded",
            ControlStatus::Satisfied,
            format!("{} audited action(s) in period", snapshot.audit_events),
        )
    };

    vec![approval, chain_finding("SOX-2", snapshot), recorded]
}

fn gdpr_findings(snapshot: &ComplianceSnapshot) -> Vec<ControlFinding> {
    let consent = if snapshot.members_seen == 0 {
        ControlFinding::new(
            "GDPR-1",
            "Members have recorded processing consent",
            ControlStatus::NotApplicable,
            "no members in consent ledger",
        )
    } else if snapshot.members_with_essential_consent == snapshot.members_seen {
        ControlFinding::new(
            "GDPR-1",
            "Members have recorded processing consent",
            ControlStatus::Satisfied,
            format!(
                "{}/{} members hold effective essential consent",
                snapshot.members_with_essential_consent, snapshot.members_seen
            ),
        )
    } else {
        ControlFinding::new(
            "GDPR-1",
            "Members have recorded processing consent",
            ControlStatus::Deficient,
            format!(
                "{}/{} members hold effective essential consent",
                snapshot.members_with_essential_consent, snapshot.members_seen
            ),
        )
    };

    let total_kinds = RecordKind::ALL.len();
    let retention = if snapshot.retention_kinds_covered == total_kinds {
        ControlFinding::new(
            "GDPR-2",
            "Every record kind has a retention policy",
            ControlStatus::Satisfied,
            format!("{}/{} record kinds covered", snapshot.retention_kinds_covered, total_kinds),
        )
    } else {
        ControlFinding::new(
            "GDPR-2",
            "Every record kind has a retention policy",
            ControlStatus::Deficient,
            format!("{}/{} record kinds covered", snapshot.retention_kinds_covered, total_kinds),
        )
    };

    let purges = if snapshot.overdue_purge_candidates == 0 {
        ControlFinding::new(
            "GDPR-3",
            "No records are held past their retention bound",
            ControlStatus::Satisfied,
            "no overdue purge candidates",
        )
    } else {
        ControlFinding::new(
            "GDPR-3",
            "No records are held past their retention bound",
            ControlStatus::Deficient,
            format!("{} record(s) overdue for purge", snapshot.overdue_purge_candidates),
        )
    };

    vec![consent, retention, purges, chain_finding("GDPR-4", snapshot)]
}

fn hipaa_findings(snapshot: &ComplianceSnapshot) -> Vec<ControlFinding> {
    let access = if snapshot.all_routes_authenticated {
        ControlFinding::new(
            "HIPAA-1",
            "Access to records requires authentication",
            ControlStatus::Satisfied,
            "all non-health routes require a bearer credential",
        )
    } else {
        ControlFinding::new(
            "HIPAA-1",
            "Access to records requires authentication",
            ControlStatus::Deficient,
            "unauthenticated routes expose records",
        )
    };
    vec![access, chain_finding("HIPAA-2", snapshot)]
}

fn pci_findings(snapshot: &ComplianceSnapshot) -> Vec<ControlFinding> {
    let cardholder = if snapshot.stores_payment_card_data {
        ControlFinding::new(
            "PCI-1",
            "No cardholder data is stored",
            ControlStatus::Deficient,
            "a store holds payment-card data",
        )
    } else {
        ControlFinding::new(
            "PCI-1",
            "No cardholder data is stored",
            ControlStatus::Satisfied,
            "no store holds payment-card data",
        )
    };

    let purges = if snapshot.overdue_purge_candidates == 0 {
        ControlFinding::new(
            "PCI-2",
            "Stored records respect retention bounds",
            ControlStatus::Satisfied,
            "no overdue purge candidates",
        )
    } else {
        ControlFinding::new(
            "PCI-2",
            "Stored records respect retention bounds",
            ControlStatus::Deficient,
            format!("{} record(s) overdue for purge", snapshot.overdue_purge_candidates),
        )
    };

    vec![cardholder, purges]
}

// ─── Tests ───────────────────────────────────────────────────────────
