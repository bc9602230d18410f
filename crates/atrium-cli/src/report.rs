//! # Report Subcommand
//!
//! Generates a compliance report offline from a snapshot file — the
//! same JSON shape the API aggregates before calling the generator.
//! Useful for rehearsing an audit against exported evidence without a
//! running server.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use uuid::Uuid;

use atrium_compliance::{
    generate_report, ComplianceFramework, ComplianceSnapshot, ReportingPeriod,
};
use atrium_core::{TenantId, Timestamp};

/// Arguments for the report subcommand.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Framework to evaluate (sox, gdpr, hipaa, pci_dss).
    #[arg(long)]
    pub framework: String,

    /// Path to a JSON snapshot of the evidence counts.
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Tenant the report is attributed to.
    #[arg(long)]
    pub tenant: Uuid,

    /// Trailing days the report covers, ending now.
    #[arg(long, default_value_t = 30)]
    pub period_days: i64,
}

/// Generate the report and print it as JSON.
pub fn run(args: ReportArgs) -> anyhow::Result<()> {
    let framework: ComplianceFramework = args.framework.parse()?;
    let raw = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("reading {}", args.snapshot.display()))?;
    let snapshot: ComplianceSnapshot =
        serde_json::from_str(&raw).context("parsing snapshot JSON")?;

    let now = Timestamp::now();
    let period = ReportingPeriod::trailing_days(now, args.period_days);
    let report = generate_report(TenantId::from(args.tenant), framework, period, &snapshot, now);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
