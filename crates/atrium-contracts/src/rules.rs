//! # Renewal Rules
//!
//! A `RenewalRule` is a configured policy that auto-generates renewal
//! proposals for contracts approaching expiry. Rules filter on the
//! expiry window, minimum contract value, service category, and the
//! member's auto-renew opt-in; matching is pure and takes the
//! evaluation time explicitly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atrium_catalog::ServiceCategory;
use atrium_core::money::BPS_SCALE;
use atrium_core::{Money, RuleId, TenantId, Timestamp};

use crate::contract::{Contract, ContractState};

/// Errors from rule validation and lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Rule name was empty or whitespace.
    #[error("rule name must not be empty")]
    EmptyName,

    /// The expiry window must cover at least one day.
    #[error("days_before_expiry must be at least 1")]
    EmptyWindow,

    /// Term extension must cover at least one day.
    #[error("term_extension_days must be at least 1")]
    EmptyExtension,

    /// Price adjustment would make the renewed value negative.
    #[error("price adjustment {0} bps below -100%")]
    AdjustmentOutOfRange(i64),

    /// No rule with the given id in the tenant's registry.
    #[error("renewal rule not found: {0}")]
    NotFound(RuleId),
}

/// A configured renewal policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalRule {
    /// Unique rule identifier.
    pub id: RuleId,
    /// The tenant that owns this rule.
    pub tenant_id: TenantId,
    /// Display name; also the tie-breaker for equal windows.
    pub name: String,
    /// Contracts expiring within this many days are eligible.
    pub days_before_expiry: u32,
    /// Only contracts at or above this monthly value match.
    pub min_monthly_value: Option<Money>,
    /// Only contracts in one of these categories match. `None` matches
    /// any contract; `Some` never matches an uncategorized contract.
    pub categories: Option<Vec<ServiceCategory>>,
    /// Only contracts whose member opted into auto-renewal match.
    pub require_auto_renew: bool,
    /// Whether generated proposals start pre-approved.
    pub auto_approve: bool,
    /// Days added to the term by the renewal.
    pub term_extension_days: u32,
    /// Signed price adjustment applied to the monthly value, in basis
    /// points (e.g., `300` = +3%, `-500` = −5%).
    pub price_adjustment_bps: i64,
    /// Disabled rules never match.
    pub enabled: bool,
    /// When the rule was created.
    pub created_at: Timestamp,
}

impl RenewalRule {
    /// Create a new enabled rule, validating its parameters.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        days_before_expiry: u32,
        min_monthly_value: Option<Money>,
        categories: Option<Vec<ServiceCategory>>,
        require_auto_renew: bool,
        auto_approve: bool,
        term_extension_days: u32,
        price_adjustment_bps: i64,
    ) -> Result<Self, RuleError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RuleError::EmptyName);
        }
        if days_before_expiry == 0 {
            return Err(RuleError::EmptyWindow);
        }
        if term_extension_days == 0 {
            return Err(RuleError::EmptyExtension);
        }
        if price_adjustment_bps <= -BPS_SCALE {
            return Err(RuleError::AdjustmentOutOfRange(price_adjustment_bps));
        }
        Ok(Self {
            id: RuleId::new(),
            tenant_id,
            name,
            days_before_expiry,
            min_monthly_value,
            categories,
            require_auto_renew,
            auto_approve,
            term_extension_days,
            price_adjustment_bps,
            enabled: true,
            created_at: Timestamp::now(),
        })
    }

    /// Whether this rule matches `contract` at evaluation time `now`.
    ///
    /// A match requires: rule enabled, contract Active, expiry within
    /// `[0, days_before_expiry]` days, the value floor met, the category
    /// filter satisfied, and the auto-renew opt-in when required.
    /// Contracts already past their end date are not eligible — expiry
    /// processing owns those.
    pub fn matches(&self, contract: &Contract, now: Timestamp) -> bool {
        if !self.enabled || contract.state != ContractState::Active {
            return false;
        }
        let days_left = contract.days_until_expiry(now);
        if days_left < 0 || days_left > i64::from(self.days_before_expiry) {
            return false;
        }
        if let Some(floor) = self.min_monthly_value {
            if contract.monthly_value.currency != floor.currency
                || contract.monthly_value.minor < floor.minor
            {
                return false;
            }
        }
        if let Some(categories) = &self.categories {
            match contract.category {
                Some(category) if categories.contains(&category) => {}
                _ => return false,
            }
        }
        if self.require_auto_renew && !contract.auto_renew {
            return false;
        }
        true
    }

    /// The renewed monthly value under this rule's price adjustment.
    pub fn adjusted_value(&self, monthly_value: Money) -> Result<Money, RuleError> {
        monthly_value
            .scale_bps(BPS_SCALE + self.price_adjustment_bps)
            .map_err(|_| RuleError::AdjustmentOutOfRange(self.price_adjustment_bps))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
