//! # Multiplier Bands
//!
//! The basis-point bands for each step of the pricing chain. Band edges
//! are inclusive on the lower bound; 10,000 bps is the identity multiplier.

use atrium_catalog::RequestPriority;
use atrium_core::money::BPS_SCALE;

/// Demand multiplier from the recent request count for the service.
///
/// | recent requests | multiplier |
/// |-----------------|------------|
/// | 0–9             | 1.0×       |
/// | 10–24           | 1.15×      |
/// | 25–49           | 1.3×       |
/// | ≥50             | 1.5×       |
pub fn demand_multiplier_bps(recent_request_count: u32) -> i64 {
    match recent_request_count {
        0..=9 => BPS_SCALE,
        10..=24 => 11_500,
        25..=49 => 13_000,
        _ => 15_000,
    }
}

/// Time-to-delivery multiplier from the hours remaining until the
/// requested delivery time. Past-due windows price as rush orders.
///
/// | hours until needed | multiplier |
/// |--------------------|------------|
/// | ≤24 (or past due)  | 1.5×       |
/// | 25–72              | 1.2×       |
/// | >72                | 1.0×       |
pub fn delivery_multiplier_bps(hours_until_needed: i64) -> i64 {
    if hours_until_needed <= 24 {
        15_000
    } else if hours_until_needed <= 72 {
        12_000
    } else {
        BPS_SCALE
    }
}

/// Priority multiplier.
///
/// | priority | multiplier |
/// |----------|------------|
/// | Low      | 0.95×      |
/// | Standard | 1.0×       |
/// | High     | 1.25×      |
/// | Urgent   | 1.5×       |
pub fn priority_multiplier_bps(priority: RequestPriority) -> i64 {
    match priority {
        RequestPriority::Low => 9_500,
        RequestPriority::Standard => BPS_SCALE,
        RequestPriority::High => 12_500,
        RequestPriority::Urgent => 15_000,
    }
}

/// Volume discount in basis points of the running amount.
///
/// | quantity | discount |
/// |----------|----------|
/// | ≥100     | 10%      |
/// | 50–99    | 7%       |
/// | 20–49    | 5%       |
/// | 10–19    | 2%       |
/// | <10      | none     |
pub fn volume_discount_bps(quantity: u32) -> i64 {
    match quantity {
        0..=9 => 0,
        10..=19 => 200,
        20..=49 => 500,
        50..=99 => 700,
        _ => 1_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demand_band_edges() {
        assert_eq!(demand_multiplier_bps(0), 10_000);
        assert_eq!(demand_multiplier_bps(9), 10_000);
        assert_eq!(demand_multiplier_bps(10), 11_500);
        assert_eq!(demand_multiplier_bps(24), 11_500);
        assert_eq!(demand_multiplier_bps(25), 13_000);
        assert_eq!(demand_multiplier_bps(49), 13_000);
        assert_eq!(demand_multiplier_bps(50), 15_000);
        assert_eq!(demand_multiplier_bps(u32::MAX), 15_000);
    }

    #[test]
    fn test_delivery_band_edges() {
        assert_eq!(delivery_multiplier_bps(-5), 15_000);
        assert_eq!(delivery_multiplier_bps(0), 15_000);
        assert_eq!(delivery_multiplier_bps(24), 15_000);
        assert_eq!(delivery_multiplier_bps(25), 12_000);
        assert_eq!(delivery_multiplier_bps(72), 12_000);
        assert_eq!(delivery_multiplier_bps(73), 10_000);
    }

    #[test]
    fn test_priority_bands() {
        use RequestPriority::*;
        assert_eq!(priority_multiplier_bps(Low), 9_500);
        assert_eq!(priority_multiplier_bps(Standard), 10_000);
        assert_eq!(priority_multiplier_bps(High), 12_500);
        assert_eq!(priority_multiplier_bps(Urgent), 15_000);
    }

    #[test]
    fn test_volume_discount_edges() {
        assert_eq!(volume_discount_bps(1), 0);
        assert_eq!(volume_discount_bps(9), 0);
        assert_eq!(volume_discount_bps(10), 200);
        assert_eq!(volume_discount_bps(19), 200);
        assert_eq!(volume_discount_bps(20), 500);
        assert_eq!(volume_discount_bps(49), 500);
        assert_eq!(volume_discount_bps(50), 700);
        assert_eq!(volume_discount_bps(99), 700);
        assert_eq!(volume_discount_bps(100), 1_000);
    }
}
