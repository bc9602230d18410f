//! # GDPR Consent Ledger
//!
//! Records member consent per processing purpose. The ledger is
//! append-style: withdrawal annotates the record with a timestamp, and
//! superseding consent appends a new record. Nothing is ever deleted —
//! the history itself is compliance evidence.
//!
//! Current state per (member, purpose) is the most recently recorded
//! record for that pair.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atrium_core::{ConsentId, MemberId, TenantId, Timestamp};

/// The processing purposes members consent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentPurpose {
    /// Processing required to provide the service itself.
    Essential,
    /// Product analytics.
    Analytics,
    /// Marketing communications.
    Marketing,
    /// Sharing with third-party integrations.
    ThirdPartySharing,
}

impl ConsentPurpose {
    /// The wire identifier for this purpose.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Essential => "essential",
            Self::Analytics => "analytics",
            Self::Marketing => "marketing",
            Self::ThirdPartySharing => "third_party_sharing",
        }
    }
}

impl std::fmt::Display for ConsentPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsentPurpose {
    type Err = ConsentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "essential" => Ok(Self::Essential),
            "analytics" => Ok(Self::Analytics),
            "marketing" => Ok(Self::Marketing),
            "third_party_sharing" => Ok(Self::ThirdPartySharing),
            other => Err(ConsentError::UnknownPurpose(other.to_string())),
        }
    }
}

/// Errors from the consent ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsentError {
    /// No record with the given id in the tenant's ledger.
    #[error("consent record not found: {0}")]
    NotFound(ConsentId),

    /// The record is already withdrawn.
    #[error("consent record {0} is already withdrawn")]
    AlreadyWithdrawn(ConsentId),

    /// Unrecognized purpose identifier.
    #[error("unknown consent purpose: {0}")]
    UnknownPurpose(String),
}

/// One consent statement by a member for one purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// Unique record identifier.
    pub id: ConsentId,
    /// The tenant whose ledger this record belongs to.
    pub tenant_id: TenantId,
    /// The consenting member.
    pub member_id: MemberId,
    /// The processing purpose consented to (or refused).
    pub purpose: ConsentPurpose,
    /// Whether consent was granted (`false` records an explicit refusal).
    pub granted: bool,
    /// Version of the consent text the member saw.
    pub version: String,
    /// When the statement was recorded.
    pub recorded_at: Timestamp,
    /// When the statement was withdrawn, if it has been.
    pub withdrawn_at: Option<Timestamp>,
}

/// Tenant-scoped, append-style consent ledger.
#[derive(Debug, Default)]
pub struct ConsentLedger {
    records: HashMap<TenantId, Vec<ConsentRecord>>,
}

impl ConsentLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a consent statement and return its id.
    pub fn record(
        &mut self,
        tenant_id: TenantId,
        member_id: MemberId,
        purpose: ConsentPurpose,
        granted: bool,
        version: impl Into<String>,
        recorded_at: Timestamp,
    ) -> ConsentId {
        let record = ConsentRecord {
            id: ConsentId::new(),
            tenant_id,
            member_id,
            purpose,
            granted,
            version: version.into(),
            recorded_at,
            withdrawn_at: None,
        };
        let id = record.id;
        self.records.entry(tenant_id).or_default().push(record);
        id
    }

    /// Withdraw a consent record by id. Annotates; never deletes.
    pub fn withdraw(
        &mut self,
        tenant_id: TenantId,
        id: ConsentId,
        now: Timestamp,
    ) -> Result<(), ConsentError> {
        let record = self
            .records
            .get_mut(&tenant_id)
            .and_then(|v| v.iter_mut().find(|r| r.id == id))
            .ok_or(ConsentError::NotFound(id))?;
        if record.withdrawn_at.is_some() {
            return Err(ConsentError::AlreadyWithdrawn(id));
        }
        record.withdrawn_at = Some(now);
        Ok(())
    }

    /// All of the tenant's records in append order.
    pub fn list(&self, tenant_id: TenantId) -> &[ConsentRecord] {
        self.records.get(&tenant_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The governing record for (member, purpose): the latest recorded.
    pub fn current(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        purpose: ConsentPurpose,
    ) -> Option<&ConsentRecord> {
        self.list(tenant_id)
            .iter()
            .filter(|r| r.member_id == member_id && r.purpose == purpose)
            .max_by_key(|r| r.recorded_at)
    }

    /// Whether the member currently has effective consent for `purpose`.
    pub fn has_consent(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        purpose: ConsentPurpose,
    ) -> bool {
        self.current(tenant_id, member_id, purpose)
            .is_some_and(|r| r.granted && r.withdrawn_at.is_none())
    }

    /// Members with effective consent for `purpose`.
    pub fn members_with_consent(
        &self,
        tenant_id: TenantId,
        purpose: ConsentPurpose,
    ) -> HashSet<MemberId> {
        let members: HashSet<MemberId> =
            self.list(tenant_id).iter().map(|r| r.member_id).collect();
        members
            .into_iter()
            .filter(|m| self.has_consent(tenant_id, *m, purpose))
            .collect()
    }

    /// Members that appear anywhere in the tenant's ledger.
    pub fn members_seen(&self, tenant_id: TenantId) -> HashSet<MemberId> {
        self.list(tenant_id).iter().map(|r| r.member_id).collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn test_record_and_current() {
        let tenant = TenantId::new();
        let member = MemberId::new();
        let mut ledger = ConsentLedger::new();
        ledger.record(
            tenant,
            member,
            ConsentPurpose::Marketing,
            true,
            "v1",
            ts("2026-01-01T00:00:00Z"),
        );
        assert!(ledger.has_consent(tenant, member, ConsentPurpose::Marketing));
        assert!(!ledger.has_consent(tenant, member, ConsentPurpose::Analytics));
    }

    #[test]
    fn test_latest_record_governs() {
        let tenant = TenantId::new();
        let member = MemberId::new();
        let mut ledger = ConsentLedger::new();
        ledger.record(
            tenant,
            member,
            ConsentPurpose::Marketing,
            true,
            "v1",
            ts("2026-01-01T00:00:00Z"),
        );
        ledger.record(
            tenant,
            member,
            ConsentPurpose::Marketing,
            false,
            "v2",
            ts("2026-02-01T00:00:00Z"),
        );
        assert!(!ledger.has_consent(tenant, member, ConsentPurpose::Marketing));
        // Both records remain.
        assert_eq!(ledger.list(tenant).len(), 2);
    }

    #[test]
    fn test_withdraw_annotates_without_deleting() {
        let tenant = TenantId::new();
        let member = MemberId::new();
        let mut ledger = ConsentLedger::new();
        let id = ledger.record(
            tenant,
            member,
            ConsentPurpose::Analytics,
            true,
            "v1",
            ts("2026-01-01T00:00:00Z"),
        );
        ledger.withdraw(tenant, id, ts("2026-03-01T00:00:00Z")).unwrap();

        assert!(!ledger.has_consent(tenant, member, ConsentPurpose::Analytics));
        let record = &ledger.list(tenant)[0];
        assert_eq!(record.withdrawn_at, Some(ts("2026-03-01T00:00:00Z")));
        assert!(record.granted);
    }

    #[test]
    fn test_double_withdraw_rejected() {
        let tenant = TenantId::new();
        let mut ledger = ConsentLedger::new();
        let id = ledger.record(
            tenant,
            MemberId::new(),
            ConsentPurpose::Marketing,
            true,
            "v1",
            ts("2026-01-01T00:00:00Z"),
        );
        ledger.withdraw(tenant, id, ts("2026-02-01T00:00:00Z")).unwrap();
        assert_eq!(
            ledger.withdraw(tenant, id, ts("2026-02-02T00:00:00Z")),
            Err(ConsentError::AlreadyWithdrawn(id))
        );
    }

    #[test]
    fn test_withdraw_is_tenant_scoped() {
        let tenant = TenantId::new();
        let mut ledger = ConsentLedger::new();
        let id = ledger.record(
            tenant,
            MemberId::new(),
            ConsentPurpose::Marketing,
            true,
            "v1",
            ts("2026-01-01T00:00:00Z"),
        );
        assert_eq!(
            ledger.withdraw(TenantId::new(), id, ts("2026-02-01T00:00:00Z")),
            Err(ConsentError::NotFound(id))
        );
    }

    #[test]
    fn test_members_with_consent() {
        let tenant = TenantId::new();
        let granted = MemberId::new();
        let refused = MemberId::new();
        let mut ledger = ConsentLedger::new();
        ledger.record(
            tenant,
            granted,
            ConsentPurpose::Marketing,
            true,
            "v1",
            ts("2026-01-01T00:00:00Z"),
        );
        ledger.record(
            tenant,
            refused,
            ConsentPurpose::Marketing,
            false,
            "v1",
            ts("2026-01-01T00:00:00Z"),
        );

        let with = ledger.members_with_consent(tenant, ConsentPurpose::Marketing);
        assert!(with.contains(&granted));
        assert!(!with.contains(&refused));
        assert_eq!(ledger.members_seen(tenant).len(), 2);
    }

    #[test]
    fn test_purpose_roundtrip() {
        for p in [
            ConsentPurpose::Essential,
            ConsentPurpose::Analytics,
            ConsentPurpose::Marketing,
            ConsentPurpose::ThirdPartySharing,
        ] {
            assert_eq!(p.as_str().parse::<ConsentPurpose>().unwrap(), p);
        }
    }
}
