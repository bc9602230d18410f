//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers on the platform. These
//! prevent accidental identifier confusion — you cannot pass a `SpaceId`
//! where a `ServiceId` is expected.
//!
//! ## Invariant
//!
//! Every record on the platform is tenant-scoped. `TenantId` is the first
//! key of every registry, and handler code only ever sees identifiers that
//! were resolved under the caller's tenant.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! identifier {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

identifier!(
    /// Unique identifier for a customer organization. Scopes all data access.
    TenantId,
    "tenant"
);
identifier!(
    /// Unique identifier for a member (an end user within a tenant).
    MemberId,
    "member"
);
identifier!(
    /// Unique identifier for a catalog service (desk, room, add-on).
    ServiceId,
    "service"
);
identifier!(
    /// Unique identifier for a service request.
    RequestId,
    "request"
);
identifier!(
    /// Unique identifier for a contract.
    ContractId,
    "contract"
);
identifier!(
    /// Unique identifier for a renewal rule.
    RuleId,
    "rule"
);
identifier!(
    /// Unique identifier for a renewal proposal.
    ProposalId,
    "proposal"
);
identifier!(
    /// Unique identifier for a physical or virtual workspace.
    SpaceId,
    "space"
);
identifier!(
    /// Unique identifier for a booking.
    BookingId,
    "booking"
);
identifier!(
    /// Unique identifier for a GDPR consent record.
    ConsentId,
    "consent"
);
identifier!(
    /// Unique identifier for a data-retention policy.
    PolicyId,
    "policy"
);
identifier!(
    /// Unique identifier for a generated compliance report.
    ReportId,
    "report"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_are_distinct() {
        let a = TenantId::new();
        let b = TenantId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_carries_namespace_prefix() {
        let id = ServiceId::new();
        let rendered = id.to_string();
        assert!(rendered.starts_with("service:"));
        assert!(rendered.ends_with(&id.as_uuid().to_string()));
    }

    #[test]
    fn test_from_uuid_roundtrip() {
        let raw = Uuid::new_v4();
        let id = BookingId::from(raw);
        assert_eq!(id.as_uuid(), &raw);
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = ContractId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ContractId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
