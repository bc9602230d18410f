//! # Data-Retention Policies
//!
//! A `RetentionPolicy` bounds how long a kind of record may be kept.
//! Evaluation compares record ages against the enabled policies and
//! reports purge candidates. The engine reports — deletion (and whether
//! it is anonymization instead) is an operator decision outside this
//! crate.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atrium_core::{PolicyId, TenantId, Timestamp};

/// The kinds of records retention policies can govern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Service request rows.
    ServiceRequest,
    /// Contract rows.
    Contract,
    /// Booking rows.
    Booking,
    /// Consent ledger records.
    ConsentRecord,
}

impl RecordKind {
    /// All governable kinds.
    pub const ALL: [RecordKind; 4] = [
        Self::ServiceRequest,
        Self::Contract,
        Self::Booking,
        Self::ConsentRecord,
    ];

    /// The wire identifier for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceRequest => "service_request",
            Self::Contract => "contract",
            Self::Booking => "booking",
            Self::ConsentRecord => "consent_record",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = RetentionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "service_request" => Ok(Self::ServiceRequest),
            "contract" => Ok(Self::Contract),
            "booking" => Ok(Self::Booking),
            "consent_record" => Ok(Self::ConsentRecord),
            other => Err(RetentionError::UnknownKind(other.to_string())),
        }
    }
}

/// Errors from retention policy management.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetentionError {
    /// Retention must cover at least one day.
    #[error("retain_days must be at least 1")]
    EmptyRetention,

    /// Unrecognized record kind.
    #[error("unknown record kind: {0}")]
    UnknownKind(String),

    /// No policy with the given id in the tenant's set.
    #[error("retention policy not found: {0}")]
    NotFound(PolicyId),
}

/// A configured retention bound for one record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Unique policy identifier.
    pub id: PolicyId,
    /// The tenant that owns this policy.
    pub tenant_id: TenantId,
    /// The record kind governed.
    pub record_kind: RecordKind,
    /// Maximum age in days before a record becomes a purge candidate.
    pub retain_days: u32,
    /// Disabled policies are kept but not evaluated.
    pub enabled: bool,
    /// When the policy was created.
    pub created_at: Timestamp,
}

impl RetentionPolicy {
    /// Create a new enabled policy.
    pub fn new(
        tenant_id: TenantId,
        record_kind: RecordKind,
        retain_days: u32,
    ) -> Result<Self, RetentionError> {
        if retain_days == 0 {
            return Err(RetentionError::EmptyRetention);
        }
        Ok(Self {
            id: PolicyId::new(),
            tenant_id,
            record_kind,
            retain_days,
            enabled: true,
            created_at: Timestamp::now(),
        })
    }
}

/// A record's identity and age, as supplied by the caller for evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStamp {
    /// The kind of record.
    pub kind: RecordKind,
    /// When the record was created.
    pub created_at: Timestamp,
}

/// One record past its retention bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeCandidate {
    /// The kind of record.
    pub kind: RecordKind,
    /// When the record was created.
    pub created_at: Timestamp,
    /// Days past the retention bound.
    pub overdue_days: i64,
}

/// The outcome of a retention evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeReport {
    /// When the evaluation ran.
    pub evaluated_at: Timestamp,
    /// Records examined.
    pub records_evaluated: usize,
    /// Records past their bound, oldest first.
    pub candidates: Vec<PurgeCandidate>,
}

/// Tenant-scoped set of retention policies.
#[derive(Debug, Default)]
pub struct RetentionPolicySet {
    policies: HashMap<TenantId, HashMap<PolicyId, RetentionPolicy>>,
}

impl RetentionPolicySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a policy.
    pub fn insert(&mut self, policy: RetentionPolicy) -> PolicyId {
        let id = policy.id;
        self.policies
            .entry(policy.tenant_id)
            .or_default()
            .insert(id, policy);
        id
    }

    /// Fetch a policy.
    pub fn get(&self, tenant_id: TenantId, id: PolicyId) -> Result<&RetentionPolicy, RetentionError> {
        self.policies
            .get(&tenant_id)
            .and_then(|m| m.get(&id))
            .ok_or(RetentionError::NotFound(id))
    }

    /// Fetch a policy mutably (enable/disable, bound edits).
    pub fn get_mut(
        &mut self,
        tenant_id: TenantId,
        id: PolicyId,
    ) -> Result<&mut RetentionPolicy, RetentionError> {
        self.policies
            .get_mut(&tenant_id)
            .and_then(|m| m.get_mut(&id))
            .ok_or(RetentionError::NotFound(id))
    }

    /// List the tenant's policies, by record kind then id.
    pub fn list(&self, tenant_id: TenantId) -> Vec<&RetentionPolicy> {
        let mut policies: Vec<&RetentionPolicy> = self
            .policies
            .get(&tenant_id)
            .map(|m| m.values().collect())
            .unwrap_or_default();
        policies.sort_by(|a, b| {
            a.record_kind
                .as_str()
                .cmp(b.record_kind.as_str())
                .then(a.id.cmp(&b.id))
        });
        policies
    }

    /// Record kinds covered by an enabled policy.
    pub fn covered_kinds(&self, tenant_id: TenantId) -> Vec<RecordKind> {
        RecordKind::ALL
            .into_iter()
            .filter(|kind| {
                self.policies
                    .get(&tenant_id)
                    .map(|m| m.values().any(|p| p.enabled && p.record_kind == *kind))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Evaluate the tenant's enabled policies over `records`.
    ///
    /// For a record kind with several enabled policies the tightest
    /// bound applies. Records of ungoverned kinds are never candidates.
    pub fn evaluate(
        &self,
        tenant_id: TenantId,
        records: &[RecordStamp],
        now: Timestamp,
    ) -> PurgeReport {
        let mut bounds: HashMap<RecordKind, u32> = HashMap::new();
        if let Some(policies) = self.policies.get(&tenant_id) {
            for policy in policies.values().filter(|p| p.enabled) {
                bounds
                    .entry(policy.record_kind)
                    .and_modify(|days| *days = (*days).min(policy.retain_days))
                    .or_insert(policy.retain_days);
            }
        }

        let mut candidates: Vec<PurgeCandidate> = records
            .iter()
            .filter_map(|record| {
                let bound = *bounds.get(&record.kind)?;
                let age_days = record.created_at.days_until(now);
                let overdue = age_days - i64::from(bound);
                (overdue > 0).then_some(PurgeCandidate {
                    kind: record.kind,
                    created_at: record.created_at,
                    overdue_days: overdue,
                })
            })
            .collect();
        candidates.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        PurgeReport {
            evaluated_at: now,
            records_evaluated: records.len(),
            candidates,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
