//! # Quote Subcommand
//!
//! Prices an ad-hoc quote offline through the same calculator the API
//! uses. Useful for sanity-checking a price before configuring a
//! service, and for support conversations.

use clap::Args;

use atrium_catalog::{RequestPriority, Service, ServiceCategory};
use atrium_core::{Currency, Money, TenantId};
use atrium_pricing::{price_service, PricingContext};

/// Arguments for the quote subcommand.
#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Per-unit price in minor units (cents).
    #[arg(long)]
    pub unit_price_minor: i64,

    /// Quote currency.
    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// Service category (desk, meeting_room, ...).
    #[arg(long, default_value = "desk")]
    pub category: String,

    /// Billing unit label.
    #[arg(long, default_value = "unit")]
    pub unit: String,

    /// Quantity of billing units.
    #[arg(long)]
    pub quantity: u32,

    /// Fulfilment priority (low, standard, high, urgent).
    #[arg(long, default_value = "standard")]
    pub priority: String,

    /// Recent requests feeding the demand multiplier.
    #[arg(long, default_value_t = 0)]
    pub recent_requests: u32,

    /// Hours until the service is needed.
    #[arg(long, default_value_t = 720)]
    pub hours_until_needed: i64,
}

/// Price the quote and print it as JSON.
pub fn run(args: QuoteArgs) -> anyhow::Result<()> {
    let currency: Currency = args.currency.parse().map_err(|e| anyhow::anyhow!("{e}"))?;
    let category: ServiceCategory = args.category.parse().map_err(|e| anyhow::anyhow!("{e}"))?;
    let priority: RequestPriority = args.priority.parse().map_err(|e| anyhow::anyhow!("{e}"))?;

    let service = Service::new(
        TenantId::new(),
        "ad-hoc quote",
        category,
        Money::new(args.unit_price_minor, currency),
        args.unit,
        Vec::new(),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    let ctx = PricingContext {
        recent_request_count: args.recent_requests,
        hours_until_needed: args.hours_until_needed,
        priority,
    };
    let quote = price_service(&service, args.quantity, &ctx).map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("{}", serde_json::to_string_pretty(&quote)?);
    Ok(())
}
