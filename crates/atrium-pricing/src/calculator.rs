//! # Price Quote Calculator
//!
//! Composes the pricing chain over a service row and a pre-fetched
//! context, producing a quote with a line item per step.
//!
//! ## Order
//!
//! Base/tier → demand → time-to-delivery → priority → volume discount.
//! Each multiplier applies to the running amount with round-half-up, so
//! the chain is order-sensitive by design and the order is fixed here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atrium_catalog::{RequestPriority, Service};
use atrium_core::money::BPS_SCALE;
use atrium_core::{Currency, Money, MoneyError, ServiceId};

use crate::multipliers::{
    delivery_multiplier_bps, demand_multiplier_bps, priority_multiplier_bps, volume_discount_bps,
};

/// Errors from quote computation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Quantity must be at least 1.
    #[error("quote quantity must be at least 1")]
    ZeroQuantity,

    /// The service is not currently offered.
    #[error("service {0} is inactive")]
    InactiveService(ServiceId),

    /// Monetary arithmetic failed.
    #[error("money error: {0}")]
    Money(#[from] MoneyError),
}

/// The steps of the pricing chain, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingStep {
    /// Unit price × quantity from the matching tier (or base price).
    Base,
    /// Demand multiplier from recent request volume.
    Demand,
    /// Time-to-delivery multiplier.
    Delivery,
    /// Priority multiplier.
    Priority,
    /// Volume discount.
    VolumeDiscount,
}

impl PricingStep {
    /// The wire identifier for this step.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Demand => "demand",
            Self::Delivery => "delivery",
            Self::Priority => "priority",
            Self::VolumeDiscount => "volume_discount",
        }
    }
}

/// One step's contribution to the quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Which pricing step produced this line.
    pub step: PricingStep,
    /// Human-readable detail (band, multiplier, tier).
    pub detail: String,
    /// Signed amount delta in minor units. The base line carries the
    /// full subtotal; multiplier lines carry their adjustment.
    pub amount_minor: i64,
}

/// Everything the calculator needs beyond the service row itself,
/// already fetched by the caller. The calculator does no I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingContext {
    /// Requests for this service in the demand lookback window.
    pub recent_request_count: u32,
    /// Hours from now until the requested delivery time (may be negative).
    pub hours_until_needed: i64,
    /// Fulfilment priority.
    pub priority: RequestPriority,
}

/// A computed price quote with its full line-item breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// The quoted service.
    pub service_id: ServiceId,
    /// Quoted quantity.
    pub quantity: u32,
    /// Quote currency (the service's currency).
    pub currency: Currency,
    /// The per-unit price the base line used.
    pub unit_price: Money,
    /// One line per pricing step, in application order.
    pub line_items: Vec<LineItem>,
    /// Unit price × quantity, before multipliers.
    pub subtotal: Money,
    /// Final price after the full chain.
    pub total: Money,
}

impl PriceQuote {
    /// Invariant check: the signed line items sum to the total.
    pub fn breakdown_is_consistent(&self) -> bool {
        let sum: i64 = self.line_items.iter().map(|li| li.amount_minor).sum();
        sum == self.total.minor
    }
}

/// Compute a quote for `quantity` units of `service` under `ctx`.
///
/// # Errors
///
/// Rejects zero quantities and inactive services; propagates monetary
/// overflow from pathological inputs.
pub fn price_service(
    service: &Service,
    quantity: u32,
    ctx: &PricingContext,
) -> Result<PriceQuote, PricingError> {
    if quantity == 0 {
        return Err(PricingError::ZeroQuantity);
    }
    if !service.active {
        return Err(PricingError::InactiveService(service.id));
    }

    let mut line_items = Vec::with_capacity(5);

    // Step 1: base/tier lookup.
    let unit_price = service.unit_price_for(quantity);
    let subtotal = unit_price.mul_quantity(quantity)?;
    let tier_detail = match service.tier_for(quantity) {
        Some(tier) => format!(
            "{} × {} @ {} (tier {}+)",
            quantity, service.unit, unit_price, tier.min_quantity
        ),
        None => format!("{} × {} @ {} (base price)", quantity, service.unit, unit_price),
    };
    line_items.push(LineItem {
        step: PricingStep::Base,
        detail: tier_detail,
        amount_minor: subtotal.minor,
    });
    let mut running = subtotal;

    // Step 2: demand multiplier.
    let demand_bps = demand_multiplier_bps(ctx.recent_request_count);
    running = apply_multiplier(
        &mut line_items,
        running,
        PricingStep::Demand,
        demand_bps,
        format!("{} recent requests", ctx.recent_request_count),
    )?;

    // Step 3: time-to-delivery multiplier.
    let delivery_bps = delivery_multiplier_bps(ctx.hours_until_needed);
    running = apply_multiplier(
        &mut line_items,
        running,
        PricingStep::Delivery,
        delivery_bps,
        format!("needed in {}h", ctx.hours_until_needed),
    )?;

    // Step 4: priority multiplier.
    let priority_bps = priority_multiplier_bps(ctx.priority);
    running = apply_multiplier(
        &mut line_items,
        running,
        PricingStep::Priority,
        priority_bps,
        format!("{} priority", ctx.priority),
    )?;

    // Step 5: volume discount.
    let discount_bps = volume_discount_bps(quantity);
    let discount = running.scale_bps(discount_bps)?;
    let total = running.checked_sub(discount)?;
    line_items.push(LineItem {
        step: PricingStep::VolumeDiscount,
        detail: format!("{}% volume discount", discount_bps / 100),
        amount_minor: -discount.minor,
    });

    Ok(PriceQuote {
        service_id: service.id,
        quantity,
        currency: service.base_price.currency,
        unit_price,
        line_items,
        subtotal,
        total,
    })
}

/// Apply one multiplier step, recording its delta as a line item.
fn apply_multiplier(
    line_items: &mut Vec<LineItem>,
    running: Money,
    step: PricingStep,
    bps: i64,
    context_detail: String,
) -> Result<Money, MoneyError> {
    let next = running.scale_bps(bps)?;
    let delta = next.delta_from(running)?;
    line_items.push(LineItem {
        step,
        detail: format!("{:.2}× ({context_detail})", bps as f64 / BPS_SCALE as f64),
        amount_minor: delta,
    });
    Ok(next)
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_catalog::{PricingTier, ServiceCategory};
    use atrium_core::TenantId;

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::Usd)
    }

    fn desk_service() -> Service {
        Service::new(
            TenantId::new(),
            "Hot Desk",
            ServiceCategory::Desk,
            usd(2_500),
            "day",
            vec![
                PricingTier {
                    min_quantity: 1,
                    max_quantity: Some(9),
                    unit_price: usd(2_500),
                },
                PricingTier {
                    min_quantity: 10,
                    max_quantity: Some(49),
                    unit_price: usd(2_200),
                },
                PricingTier {
                    min_quantity: 50,
                    max_quantity: None,
                    unit_price: usd(1_900),
                },
            ],
        )
        .unwrap()
    }

    fn quiet_ctx() -> PricingContext {
        PricingContext {
            recent_request_count: 0,
            hours_until_needed: 200,
            priority: RequestPriority::Standard,
        }
    }

    // ── Spec property: tier price for in-range quantity ──────────────

    #[test]
    fn test_quantity_within_tier_prices_at_tier_unit_price() {
        let svc = desk_service();
        for (quantity, expected_unit) in [(1, 2_500), (9, 2_500), (10, 2_200), (49, 2_200), (50, 1_900)] {
            let quote = price_service(&svc, quantity, &quiet_ctx()).unwrap();
            assert_eq!(quote.unit_price, usd(expected_unit), "quantity {quantity}");
        }
    }

    // ── Identity chain ───────────────────────────────────────────────

    #[test]
    fn test_all_neutral_multipliers_leave_subtotal() {
        let svc = desk_service();
        let quote = price_service(&svc, 4, &quiet_ctx()).unwrap();
        assert_eq!(quote.subtotal, usd(10_000));
        assert_eq!(quote.total, usd(10_000));
        assert!(quote.breakdown_is_consistent());
    }

    // ── Individual steps ─────────────────────────────────────────────

    #[test]
    fn test_demand_multiplier_applies() {
        let svc = desk_service();
        let ctx = PricingContext {
            recent_request_count: 12,
            ..quiet_ctx()
        };
        let quote = price_service(&svc, 4, &ctx).unwrap();
        // 4 × $25.00 = $100.00; × 1.15 = $115.00
        assert_eq!(quote.total, usd(11_500));
    }

    #[test]
    fn test_rush_delivery_multiplier_applies() {
        let svc = desk_service();
        let ctx = PricingContext {
            hours_until_needed: 12,
            ..quiet_ctx()
        };
        let quote = price_service(&svc, 4, &ctx).unwrap();
        assert_eq!(quote.total, usd(15_000));
    }

    #[test]
    fn test_low_priority_reduces_price() {
        let svc = desk_service();
        let ctx = PricingContext {
            priority: RequestPriority::Low,
            ..quiet_ctx()
        };
        let quote = price_service(&svc, 4, &ctx).unwrap();
        assert_eq!(quote.total, usd(9_500));
    }

    #[test]
    fn test_volume_discount_applies() {
        let svc = desk_service();
        // 15 days: tier 10-49 @ $22.00 = $330.00; 2% discount = $6.60
        let quote = price_service(&svc, 15, &quiet_ctx()).unwrap();
        assert_eq!(quote.subtotal, usd(33_000));
        assert_eq!(quote.total, usd(32_340));
    }

    // ── Full chain, known value ──────────────────────────────────────

    #[test]
    fn test_full_chain_known_value() {
        let svc = desk_service();
        let ctx = PricingContext {
            recent_request_count: 60,
            hours_until_needed: 24,
            priority: RequestPriority::Urgent,
        };
        // 50 × $19.00 = $950.00
        // × 1.5 (demand)   = $1425.00
        // × 1.5 (delivery) = $2137.50
        // × 1.5 (priority) = $3206.25
        // − 7%             = $3206.25 − $224.44 = $2981.81
        let quote = price_service(&svc, 50, &ctx).unwrap();
        assert_eq!(quote.subtotal, usd(95_000));
        assert_eq!(quote.total, usd(298_181));
        assert!(quote.breakdown_is_consistent());
    }

    #[test]
    fn test_line_items_in_chain_order() {
        let svc = desk_service();
        let quote = price_service(&svc, 10, &quiet_ctx()).unwrap();
        let steps: Vec<PricingStep> = quote.line_items.iter().map(|li| li.step).collect();
        assert_eq!(
            steps,
            vec![
                PricingStep::Base,
                PricingStep::Demand,
                PricingStep::Delivery,
                PricingStep::Priority,
                PricingStep::VolumeDiscount,
            ]
        );
    }

    // ── Rejections ───────────────────────────────────────────────────

    #[test]
    fn test_zero_quantity_rejected() {
        let svc = desk_service();
        assert_eq!(
            price_service(&svc, 0, &quiet_ctx()).unwrap_err(),
            PricingError::ZeroQuantity
        );
    }

    #[test]
    fn test_inactive_service_rejected() {
        let mut svc = desk_service();
        svc.active = false;
        assert!(matches!(
            price_service(&svc, 4, &quiet_ctx()),
            Err(PricingError::InactiveService(_))
        ));
    }

    // ── Determinism ──────────────────────────────────────────────────

    #[test]
    fn test_same_inputs_price_identically() {
        let svc = desk_service();
        let ctx = PricingContext {
            recent_request_count: 30,
            hours_until_needed: 48,
            priority: RequestPriority::High,
        };
        let a = price_service(&svc, 23, &ctx).unwrap();
        let b = price_service(&svc, 23, &ctx).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_quote_serde_roundtrip() {
        let svc = desk_service();
        let quote = price_service(&svc, 10, &quiet_ctx()).unwrap();
        let json = serde_json::to_string(&quote).unwrap();
        let parsed: PriceQuote = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, quote);
    }
}
