//! # Service — Catalog Offerings with Tiered Pricing
//!
//! A `Service` is a billable offering in a tenant's catalog. Each service
//! carries a base price and an optional ladder of volume pricing tiers.
//!
//! ## Invariant
//!
//! Pricing tiers are validated on every write: ascending by minimum
//! quantity, non-overlapping, contiguous, and only the last tier may be
//! open-ended. Tier prices share the service's currency. A quantity
//! therefore matches at most one tier, and every quantity at or above the
//! first tier's minimum matches exactly one.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use atrium_core::{Money, ServiceId, TenantId, Timestamp};

/// The categories of offerings a coworking operator sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    /// Hot desks and dedicated desks.
    Desk,
    /// Bookable meeting rooms.
    MeetingRoom,
    /// Private offices.
    PrivateOffice,
    /// Event and function spaces.
    EventSpace,
    /// Virtual office packages (address, mail handling).
    VirtualOffice,
    /// Amenities (lockers, parking, printing credit).
    Amenity,
    /// Support services (IT, reception, catering coordination).
    Support,
}

impl ServiceCategory {
    /// The wire identifier for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desk => "desk",
            Self::MeetingRoom => "meeting_room",
            Self::PrivateOffice => "private_office",
            Self::EventSpace => "event_space",
            Self::VirtualOffice => "virtual_office",
            Self::Amenity => "amenity",
            Self::Support => "support",
        }
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desk" => Ok(Self::Desk),
            "meeting_room" => Ok(Self::MeetingRoom),
            "private_office" => Ok(Self::PrivateOffice),
            "event_space" => Ok(Self::EventSpace),
            "virtual_office" => Ok(Self::VirtualOffice),
            "amenity" => Ok(Self::Amenity),
            "support" => Ok(Self::Support),
            other => Err(CatalogError::UnknownCategory(other.to_string())),
        }
    }
}

/// Errors from catalog validation and lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Service name was empty or whitespace.
    #[error("service name must not be empty")]
    EmptyName,

    /// The tier ladder failed structural validation.
    #[error("invalid pricing tiers: {0}")]
    InvalidTiers(String),

    /// Unrecognized category identifier.
    #[error("unknown service category: {0}")]
    UnknownCategory(String),

    /// No service with the given id in the tenant's catalog.
    #[error("service not found: {0}")]
    NotFound(ServiceId),
}

/// A volume pricing tier: quantities in `[min_quantity, max_quantity]`
/// price at `unit_price`. `max_quantity: None` means open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    /// Lowest quantity this tier covers (inclusive).
    pub min_quantity: u32,
    /// Highest quantity this tier covers (inclusive); `None` = unbounded.
    pub max_quantity: Option<u32>,
    /// Per-unit price within this tier.
    pub unit_price: Money,
}

impl PricingTier {
    /// Whether `quantity` falls within this tier.
    pub fn covers(&self, quantity: u32) -> bool {
        quantity >= self.min_quantity && self.max_quantity.map_or(true, |max| quantity <= max)
    }
}

/// A billable offering in a tenant's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Unique service identifier.
    pub id: ServiceId,
    /// The tenant that owns this service.
    pub tenant_id: TenantId,
    /// Display name.
    pub name: String,
    /// Offering category.
    pub category: ServiceCategory,
    /// Price per unit when no tier matches.
    pub base_price: Money,
    /// The billing unit (e.g., "hour", "day", "seat").
    pub unit: String,
    /// Volume pricing ladder; may be empty.
    pub pricing_tiers: Vec<PricingTier>,
    /// Whether the service is currently offered.
    pub active: bool,
    /// When the service was created.
    pub created_at: Timestamp,
    /// When the service was last updated.
    pub updated_at: Timestamp,
}

impl Service {
    /// Create a new active service, validating the name and tier ladder.
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        category: ServiceCategory,
        base_price: Money,
        unit: impl Into<String>,
        pricing_tiers: Vec<PricingTier>,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        validate_tiers(&pricing_tiers, base_price)?;
        let now = Timestamp::now();
        Ok(Self {
            id: ServiceId::new(),
            tenant_id,
            name,
            category,
            base_price,
            unit: unit.into(),
            pricing_tiers,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Re-validate the service after a mutation (tier or price edits).
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        validate_tiers(&self.pricing_tiers, self.base_price)
    }

    /// The tier covering `quantity`, if any.
    pub fn tier_for(&self, quantity: u32) -> Option<&PricingTier> {
        self.pricing_tiers.iter().find(|t| t.covers(quantity))
    }

    /// Per-unit price for `quantity`: the matching tier's price, or the
    /// base price when no tier covers it.
    pub fn unit_price_for(&self, quantity: u32) -> Money {
        self.tier_for(quantity)
            .map_or(self.base_price, |t| t.unit_price)
    }
}

/// Validate a tier ladder against the structural invariant.
fn validate_tiers(tiers: &[PricingTier], base_price: Money) -> Result<(), CatalogError> {
    for (i, tier) in tiers.iter().enumerate() {
        if tier.min_quantity == 0 {
            return Err(CatalogError::InvalidTiers(format!(
                "tier {i}: min_quantity must be at least 1"
            )));
        }
        if let Some(max) = tier.max_quantity {
            if max < tier.min_quantity {
                return Err(CatalogError::InvalidTiers(format!(
                    "tier {i}: max_quantity {max} below min_quantity {}",
                    tier.min_quantity
                )));
            }
        } else if i + 1 != tiers.len() {
            return Err(CatalogError::InvalidTiers(format!(
                "tier {i}: only the last tier may be open-ended"
            )));
        }
        if tier.unit_price.currency != base_price.currency {
            return Err(CatalogError::InvalidTiers(format!(
                "tier {i}: currency {} differs from base price currency {}",
                tier.unit_price.currency, base_price.currency
            )));
        }
        if i > 0 {
            let prev = &tiers[i - 1];
            let expected_min = match prev.max_quantity {
                Some(max) => max.saturating_add(1),
                // Unreachable in valid ladders: only the last tier is open-ended.
                None => u32::MAX,
            };
            if tier.min_quantity != expected_min {
                return Err(CatalogError::InvalidTiers(format!(
                    "tier {i}: min_quantity {} breaks contiguity (expected {expected_min})",
                    tier.min_quantity
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::Currency;

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::Usd)
    }

    fn tier(min: u32, max: Option<u32>, price: i64) -> PricingTier {
        PricingTier {
            min_quantity: min,
            max_quantity: max,
            unit_price: usd(price),
        }
    }

    fn desk_service(tiers: Vec<PricingTier>) -> Result<Service, CatalogError> {
        Service::new(
            TenantId::new(),
            "Hot Desk",
            ServiceCategory::Desk,
            usd(2_500),
            "day",
            tiers,
        )
    }

    // ── Construction & validation ────────────────────────────────────

    #[test]
    fn test_new_service_defaults_active() {
        let svc = desk_service(vec![]).unwrap();
        assert!(svc.active);
        assert_eq!(svc.created_at, svc.updated_at);
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = Service::new(
            TenantId::new(),
            "   ",
            ServiceCategory::Desk,
            usd(2_500),
            "day",
            vec![],
        );
        assert_eq!(result.unwrap_err(), CatalogError::EmptyName);
    }

    #[test]
    fn test_valid_tier_ladder_accepted() {
        let svc = desk_service(vec![
            tier(1, Some(9), 2_500),
            tier(10, Some(49), 2_200),
            tier(50, None, 1_900),
        ])
        .unwrap();
        assert_eq!(svc.pricing_tiers.len(), 3);
    }

    #[test]
    fn test_zero_min_quantity_rejected() {
        let result = desk_service(vec![tier(0, Some(9), 2_500)]);
        assert!(matches!(result, Err(CatalogError::InvalidTiers(_))));
    }

    #[test]
    fn test_inverted_tier_rejected() {
        let result = desk_service(vec![tier(10, Some(5), 2_500)]);
        assert!(matches!(result, Err(CatalogError::InvalidTiers(_))));
    }

    #[test]
    fn test_gap_in_ladder_rejected() {
        // 1-9 then 11-... leaves quantity 10 uncovered
        let result = desk_service(vec![tier(1, Some(9), 2_500), tier(11, None, 2_000)]);
        assert!(matches!(result, Err(CatalogError::InvalidTiers(_))));
    }

    #[test]
    fn test_overlap_in_ladder_rejected() {
        let result = desk_service(vec![tier(1, Some(10), 2_500), tier(10, None, 2_000)]);
        assert!(matches!(result, Err(CatalogError::InvalidTiers(_))));
    }

    #[test]
    fn test_open_ended_tier_must_be_last() {
        let result = desk_service(vec![tier(1, None, 2_500), tier(10, Some(20), 2_000)]);
        assert!(matches!(result, Err(CatalogError::InvalidTiers(_))));
    }

    #[test]
    fn test_tier_currency_must_match_base() {
        let result = desk_service(vec![PricingTier {
            min_quantity: 1,
            max_quantity: None,
            unit_price: Money::new(2_000, Currency::Eur),
        }]);
        assert!(matches!(result, Err(CatalogError::InvalidTiers(_))));
    }

    // ── Tier lookup ──────────────────────────────────────────────────

    #[test]
    fn test_tier_for_picks_covering_tier() {
        let svc = desk_service(vec![
            tier(1, Some(9), 2_500),
            tier(10, Some(49), 2_200),
            tier(50, None, 1_900),
        ])
        .unwrap();

        assert_eq!(svc.tier_for(1).unwrap().unit_price, usd(2_500));
        assert_eq!(svc.tier_for(9).unwrap().unit_price, usd(2_500));
        assert_eq!(svc.tier_for(10).unwrap().unit_price, usd(2_200));
        assert_eq!(svc.tier_for(49).unwrap().unit_price, usd(2_200));
        assert_eq!(svc.tier_for(50).unwrap().unit_price, usd(1_900));
        assert_eq!(svc.tier_for(5_000).unwrap().unit_price, usd(1_900));
    }

    #[test]
    fn test_unit_price_falls_back_to_base() {
        let svc = desk_service(vec![tier(10, None, 2_000)]).unwrap();
        // Below the first tier's minimum: base price applies.
        assert_eq!(svc.unit_price_for(3), usd(2_500));
        assert_eq!(svc.unit_price_for(10), usd(2_000));
    }

    // ── Category parsing ─────────────────────────────────────────────

    #[test]
    fn test_category_roundtrip() {
        for cat in [
            ServiceCategory::Desk,
            ServiceCategory::MeetingRoom,
            ServiceCategory::PrivateOffice,
            ServiceCategory::EventSpace,
            ServiceCategory::VirtualOffice,
            ServiceCategory::Amenity,
            ServiceCategory::Support,
        ] {
            assert_eq!(cat.as_str().parse::<ServiceCategory>().unwrap(), cat);
        }
        assert!("penthouse".parse::<ServiceCategory>().is_err());
    }

    #[test]
    fn test_service_serde_roundtrip() {
        let svc = desk_service(vec![tier(1, None, 2_500)]).unwrap();
        let json = serde_json::to_string(&svc).unwrap();
        let parsed: Service = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, svc);
    }
}
