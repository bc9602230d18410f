//! # Validate Subcommand
//!
//! Validates a service definition file against the catalog invariants —
//! non-empty name, and a contiguous, non-overlapping, ascending tier
//! ladder in the base price's currency — before it is pushed to a
//! tenant's catalog.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Deserialize;

use atrium_catalog::{PricingTier, Service, ServiceCategory};
use atrium_core::{Money, TenantId};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to a JSON service definition.
    #[arg(long)]
    pub file: PathBuf,
}

/// A service definition as operators author it: the catalog fields
/// without server-assigned identity or timestamps.
#[derive(Debug, Deserialize)]
struct ServiceDefinition {
    name: String,
    category: ServiceCategory,
    base_price: Money,
    unit: String,
    #[serde(default)]
    pricing_tiers: Vec<PricingTier>,
}

/// Validate the definition; exits non-zero with the violation on error.
pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let definition: ServiceDefinition =
        serde_json::from_str(&raw).context("parsing service definition JSON")?;

    // Construction runs the same validation the API applies on create.
    let service = Service::new(
        TenantId::new(),
        definition.name,
        definition.category,
        definition.base_price,
        definition.unit,
        definition.pricing_tiers,
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!(
        "ok: \"{}\" ({}) with {} pricing tier(s)",
        service.name,
        service.category,
        service.pricing_tiers.len()
    );
    Ok(())
}
