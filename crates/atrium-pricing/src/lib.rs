//! # atrium-pricing — Dynamic Service Pricing
//!
//! The pricing calculator: a pure, stateless, sequential function chain.
//!
//! ```text
//! tier lookup ──▶ demand ──▶ time-to-delivery ──▶ priority ──▶ volume discount
//! ```
//!
//! Each step is a basis-point multiplier applied to the running amount;
//! the result is a [`PriceQuote`] with one line item per step. The
//! calculator does no I/O — everything it needs (the service row, the
//! recent-request count, the delivery window) arrives in a
//! [`PricingContext`] already fetched by the caller.
//!
//! ## Determinism
//!
//! All arithmetic is integer basis-point math on `Money` (minor units,
//! round-half-up once per step). The same inputs always price to the
//! same cent.

pub mod calculator;
pub mod multipliers;

pub use calculator::{price_service, LineItem, PriceQuote, PricingContext, PricingError, PricingStep};
pub use multipliers::{
    delivery_multiplier_bps, demand_multiplier_bps, priority_multiplier_bps, volume_discount_bps,
};
