//! # Audit Trail — Hash-Chained Event Log
//!
//! Append-only audit log with one sha256 hash chain per tenant. Each
//! event's digest covers the previous event's digest, so any in-place
//! edit, deletion, or reorder breaks verification at the first affected
//! link.
//!
//! ## Invariant
//!
//! `verify()` recomputes the chain from genesis. An intact chain means
//! the log content and order are exactly what was appended.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use atrium_core::{TenantId, Timestamp};

/// Digest of the empty chain (64 hex zeros).
const GENESIS_DIGEST: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Errors from audit-trail verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// The chain failed verification at the given sequence number.
    #[error("audit chain broken at seq {seq}: {reason}")]
    BrokenChain {
        /// Sequence number of the first corrupt event.
        seq: u64,
        /// What failed: digest mismatch, sequence gap, or broken link.
        reason: String,
    },
}

/// One audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the tenant's chain, starting at 0.
    pub seq: u64,
    /// The tenant whose chain this event belongs to.
    pub tenant_id: TenantId,
    /// Who performed the action (API key name, member, or "system").
    pub actor: String,
    /// The action performed (e.g., "service.create").
    pub action: String,
    /// The resource acted on (display form of its identifier).
    pub resource: String,
    /// When the action occurred.
    pub timestamp: Timestamp,
    /// Digest of the previous event (genesis digest for seq 0).
    pub prev_digest: String,
    /// sha256 over this event's fields and `prev_digest`, lowercase hex.
    pub digest: String,
}

/// Per-tenant hash-chained audit log.
#[derive(Debug, Default)]
pub struct AuditTrail {
    chains: HashMap<TenantId, Vec<AuditEvent>>,
}

impl AuditTrail {
    /// Create an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the tenant's chain and return it.
    pub fn append(
        &mut self,
        tenant_id: TenantId,
        actor: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
        timestamp: Timestamp,
    ) -> &AuditEvent {
        let chain = self.chains.entry(tenant_id).or_default();
        let seq = chain.len() as u64;
        let prev_digest = chain
            .last()
            .map(|e| e.digest.clone())
            .unwrap_or_else(|| GENESIS_DIGEST.to_string());

        let actor = actor.into();
        let action = action.into();
        let resource = resource.into();
        let digest = event_digest(&prev_digest, seq, tenant_id, &actor, &action, &resource, timestamp);

        chain.push(AuditEvent {
            seq,
            tenant_id,
            actor,
            action,
            resource,
            timestamp,
            prev_digest,
            digest,
        });
        // Just pushed; the chain is non-empty.
        &chain[chain.len() - 1]
    }

    /// The tenant's events in append order.
    pub fn events(&self, tenant_id: TenantId) -> &[AuditEvent] {
        self.chains.get(&tenant_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of events in the tenant's chain.
    pub fn len(&self, tenant_id: TenantId) -> usize {
        self.events(tenant_id).len()
    }

    /// Whether the tenant's chain is empty.
    pub fn is_empty(&self, tenant_id: TenantId) -> bool {
        self.events(tenant_id).is_empty()
    }

    /// Recompute the tenant's chain from genesis.
    ///
    /// Returns the verified length, or the first corrupt link.
    pub fn verify(&self, tenant_id: TenantId) -> Result<usize, AuditError> {
        let events = self.events(tenant_id);
        let mut prev = GENESIS_DIGEST.to_string();
        for (i, event) in events.iter().enumerate() {
            if event.seq != i as u64 {
                return Err(AuditError::BrokenChain {
                    seq: event.seq,
                    reason: format!("sequence gap: expected {i}"),
                });
            }
            if event.prev_digest != prev {
                return Err(AuditError::BrokenChain {
                    seq: event.seq,
                    reason: "previous-digest link mismatch".to_string(),
                });
            }
            let expected = event_digest(
                &event.prev_digest,
                event.seq,
                event.tenant_id,
                &event.actor,
                &event.action,
                &event.resource,
                event.timestamp,
            );
            if event.digest != expected {
                return Err(AuditError::BrokenChain {
                    seq: event.seq,
                    reason: "digest mismatch".to_string(),
                });
            }
            prev = event.digest.clone();
        }
        Ok(events.len())
    }

    #[cfg(test)]
    pub(crate) fn events_mut(&mut self, tenant_id: TenantId) -> &mut Vec<AuditEvent> {
        self.chains.entry(tenant_id).or_default()
    }
}

/// sha256 over the event fields, pipe-delimited, lowercase hex.
fn event_digest(
    prev_digest: &str,
    seq: u64,
    tenant_id: TenantId,
    actor: &str,
    action: &str,
    resource: &str,
    timestamp: Timestamp,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prev_digest.as_bytes());
    hasher.update(b"|");
    hasher.update(seq.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(tenant_id.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(actor.as_bytes());
    hasher.update(b"|");
    hasher.update(action.as_bytes());
    hasher.update(b"|");
    hasher.update(resource.as_bytes());
    hasher.update(b"|");
    hasher.update(timestamp.to_iso8601().as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> Timestamp {
        Timestamp::parse("2026-06-01T12:00:00Z").unwrap()
    }

    #[test]
    fn test_append_links_to_genesis() {
        let tenant = TenantId::new();
        let mut trail = AuditTrail::new();
        let event = trail.append(tenant, "ops", "service.create", "service:abc", ts());
        assert_eq!(event.seq, 0);
        assert_eq!(event.prev_digest, GENESIS_DIGEST);
        assert_eq!(event.digest.len(), 64);
    }

    #[test]
    fn test_chain_links_sequentially() {
        let tenant = TenantId::new();
        let mut trail = AuditTrail::new();
        let first_digest = trail
            .append(tenant, "ops", "a", "r1", ts())
            .digest
            .clone();
        let second = trail.append(tenant, "ops", "b", "r2", ts());
        assert_eq!(second.seq, 1);
        assert_eq!(second.prev_digest, first_digest);
    }

    #[test]
    fn test_verify_intact_chain() {
        let tenant = TenantId::new();
        let mut trail = AuditTrail::new();
        for i in 0..10 {
            trail.append(tenant, "ops", format!("action.{i}"), "r", ts());
        }
        assert_eq!(trail.verify(tenant).unwrap(), 10);
    }

    #[test]
    fn test_verify_empty_chain() {
        let trail = AuditTrail::new();
        assert_eq!(trail.verify(TenantId::new()).unwrap(), 0);
    }

    #[test]
    fn test_tamper_with_field_detected() {
        let tenant = TenantId::new();
        let mut trail = AuditTrail::new();
        trail.append(tenant, "ops", "a", "r1", ts());
        trail.append(tenant, "ops", "b", "r2", ts());

        trail.events_mut(tenant)[0].action = "forged".to_string();
        match trail.verify(tenant).unwrap_err() {
            AuditError::BrokenChain { seq, .. } => assert_eq!(seq, 0),
        }
    }

    #[test]
    fn test_deleting_middle_event_detected() {
        let tenant = TenantId::new();
        let mut trail = AuditTrail::new();
        for i in 0..3 {
            trail.append(tenant, "ops", format!("action.{i}"), "r", ts());
        }
        trail.events_mut(tenant).remove(1);
        assert!(trail.verify(tenant).is_err());
    }

    #[test]
    fn test_reordering_detected() {
        let tenant = TenantId::new();
        let mut trail = AuditTrail::new();
        trail.append(tenant, "ops", "a", "r1", ts());
        trail.append(tenant, "ops", "b", "r2", ts());
        trail.events_mut(tenant).swap(0, 1);
        assert!(trail.verify(tenant).is_err());
    }

    #[test]
    fn test_chains_are_tenant_isolated() {
        let t1 = TenantId::new();
        let t2 = TenantId::new();
        let mut trail = AuditTrail::new();
        trail.append(t1, "ops", "a", "r", ts());
        assert_eq!(trail.len(t1), 1);
        assert_eq!(trail.len(t2), 0);
        assert!(trail.is_empty(t2));
        assert_eq!(trail.verify(t2).unwrap(), 0);
    }
}
