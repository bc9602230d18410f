//! # Money — Integer Minor-Unit Amounts
//!
//! Defines `Money`, an amount in integer minor units (cents) tagged with a
//! currency, and the basis-point arithmetic the pricing chain is built on.
//!
//! ## Invariant
//!
//! Floats never enter monetary arithmetic. Multipliers are expressed in
//! basis points (1/10,000) and applied in `i128` intermediate precision
//! with round-half-up, so the same quote computes to the same cent on
//! every node.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Basis-point scale: 10,000 bps = 1.0×.
pub const BPS_SCALE: i64 = 10_000;

/// ISO 4217 currencies supported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// United States dollar.
    Usd,
    /// Euro.
    Eur,
    /// Pound sterling.
    Gbp,
}

impl Currency {
    /// The ISO 4217 alphabetic code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Errors from monetary arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Two amounts in different currencies were combined.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        /// Currency of the left operand.
        left: Currency,
        /// Currency of the right operand.
        right: Currency,
    },

    /// Arithmetic overflowed the minor-unit range.
    #[error("monetary arithmetic overflow")]
    Overflow,

    /// An amount that must be non-negative was negative.
    #[error("negative amount: {0} minor units")]
    NegativeAmount(i64),

    /// Unrecognized currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// An amount in integer minor units (cents) with a currency tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// The amount in minor units (e.g., cents for USD).
    pub minor: i64,
    /// The currency of the amount.
    pub currency: Currency,
}

impl Money {
    /// Create an amount from minor units.
    pub fn new(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Add two amounts, rejecting currency mismatch and overflow.
    pub fn checked_add(self, other: Money) -> Result<Money, MoneyError> {
        self.require_same_currency(other)?;
        let minor = self
            .minor
            .checked_add(other.minor)
            .ok_or(MoneyError::Overflow)?;
        Ok(Money::new(minor, self.currency))
    }

    /// Subtract `other` from `self`, rejecting currency mismatch and overflow.
    pub fn checked_sub(self, other: Money) -> Result<Money, MoneyError> {
        self.require_same_currency(other)?;
        let minor = self
            .minor
            .checked_sub(other.minor)
            .ok_or(MoneyError::Overflow)?;
        Ok(Money::new(minor, self.currency))
    }

    /// Multiply by a whole quantity.
    pub fn mul_quantity(self, quantity: u32) -> Result<Money, MoneyError> {
        let minor = self
            .minor
            .checked_mul(i64::from(quantity))
            .ok_or(MoneyError::Overflow)?;
        Ok(Money::new(minor, self.currency))
    }

    /// Scale by a basis-point multiplier with round-half-up.
    ///
    /// `scale_bps(11_500)` is a 1.15× multiplier; `scale_bps(500)` is 5%.
    /// The amount must be non-negative.
    pub fn scale_bps(self, bps: i64) -> Result<Money, MoneyError> {
        if self.minor < 0 {
            return Err(MoneyError::NegativeAmount(self.minor));
        }
        if bps < 0 {
            return Err(MoneyError::NegativeAmount(bps));
        }
        let scaled = (i128::from(self.minor) * i128::from(bps) + i128::from(BPS_SCALE / 2))
            / i128::from(BPS_SCALE);
        let minor = i64::try_from(scaled).map_err(|_| MoneyError::Overflow)?;
        Ok(Money::new(minor, self.currency))
    }

    /// The delta between this amount and `other` (`self - other`).
    ///
    /// Used by the quote builder to express each pricing step as a
    /// signed line-item adjustment.
    pub fn delta_from(self, other: Money) -> Result<i64, MoneyError> {
        self.require_same_currency(other)?;
        self.minor
            .checked_sub(other.minor)
            .ok_or(MoneyError::Overflow)
    }

    fn require_same_currency(self, other: Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let abs = self.minor.unsigned_abs();
        write!(f, "{sign}{}.{:02} {}", abs / 100, abs % 100, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::Usd)
    }

    #[test]
    fn test_checked_add_same_currency() {
        let total = usd(1_500).checked_add(usd(2_500)).unwrap();
        assert_eq!(total, usd(4_000));
    }

    #[test]
    fn test_checked_add_currency_mismatch() {
        let result = usd(100).checked_add(Money::new(100, Currency::Eur));
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_checked_add_overflow() {
        let result = usd(i64::MAX).checked_add(usd(1));
        assert_eq!(result, Err(MoneyError::Overflow));
    }

    #[test]
    fn test_mul_quantity() {
        assert_eq!(usd(250).mul_quantity(4).unwrap(), usd(1_000));
    }

    // ---- basis-point scaling ----

    #[test]
    fn test_scale_bps_identity() {
        assert_eq!(usd(12_345).scale_bps(BPS_SCALE).unwrap(), usd(12_345));
    }

    #[test]
    fn test_scale_bps_multiplier() {
        // 1.15 * $100.00 = $115.00
        assert_eq!(usd(10_000).scale_bps(11_500).unwrap(), usd(11_500));
    }

    #[test]
    fn test_scale_bps_rounds_half_up() {
        // 5% of 9 cents = 0.45 cents, rounds to 0
        assert_eq!(usd(9).scale_bps(500).unwrap(), usd(0));
        // 5% of 10 cents = 0.5 cents, rounds up to 1
        assert_eq!(usd(10).scale_bps(500).unwrap(), usd(1));
    }

    #[test]
    fn test_scale_bps_rejects_negative_amount() {
        assert!(matches!(
            usd(-100).scale_bps(BPS_SCALE),
            Err(MoneyError::NegativeAmount(_))
        ));
    }

    #[test]
    fn test_delta_from() {
        assert_eq!(usd(11_500).delta_from(usd(10_000)).unwrap(), 1_500);
        assert_eq!(usd(9_000).delta_from(usd(10_000)).unwrap(), -1_000);
    }

    // ---- currency parsing / display ----

    #[test]
    fn test_currency_parse() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::Eur);
        assert!("XYZ".parse::<Currency>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(usd(123_456).to_string(), "1234.56 USD");
        assert_eq!(usd(-50).to_string(), "-0.50 USD");
    }

    #[test]
    fn test_serde_roundtrip() {
        let m = usd(9_999);
        let json = serde_json::to_string(&m).unwrap();
        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, parsed);
    }
}
