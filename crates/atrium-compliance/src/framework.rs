//! # Compliance Frameworks — Single Source of Truth
//!
//! Defines the `ComplianceFramework` enum. This is the ONE definition
//! used across the platform; every `match` on it must be exhaustive, so
//! adding a framework forces every consumer to handle it at compile time.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use atrium_core::CoreError;

/// The regulatory frameworks the platform reports against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceFramework {
    /// Sarbanes-Oxley: financial-record controls over contract approval
    /// and audit continuity.
    Sox,
    /// EU General Data Protection Regulation: consent and retention.
    Gdpr,
    /// US Health Insurance Portability and Accountability Act: access
    /// control and audit posture.
    Hipaa,
    /// Payment Card Industry Data Security Standard: cardholder-data
    /// handling (structural — the platform stores none).
    PciDss,
}

impl ComplianceFramework {
    /// All frameworks, in reporting order.
    pub const ALL: [ComplianceFramework; 4] = [Self::Sox, Self::Gdpr, Self::Hipaa, Self::PciDss];

    /// The wire identifier for this framework.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sox => "sox",
            Self::Gdpr => "gdpr",
            Self::Hipaa => "hipaa",
            Self::PciDss => "pci_dss",
        }
    }
}

impl std::fmt::Display for ComplianceFramework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceFramework {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sox" => Ok(Self::Sox),
            "gdpr" => Ok(Self::Gdpr),
            "hipaa" => Ok(Self::Hipaa),
            "pci_dss" | "pci-dss" => Ok(Self::PciDss),
            other => Err(CoreError::Validation(format!(
                "unknown compliance framework: {other}"
            ))),
        }
    }
}
