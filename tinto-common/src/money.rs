//! Monetary amounts and DIAN's decimal formatting convention.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A signed amount in minor currency units (e.g. centavos for COP), matching
/// the distilled data model's choice of `i64` minor-unit storage to avoid
/// floating point in financial totals.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MinorUnits(pub i64);

impl MinorUnits {
    pub const ZERO: Self = Self(0);

    /// Round `quantity * unit_price_minor_units` half-up to the nearest minor
    /// unit. `quantity` is a decimal (e.g. `1.5` units), `unit_price` is
    /// already in minor units (e.g. centavos) for one whole unit.
    ///
    /// Used by [`crate::invoice::LineItem`]'s `line_total` invariant (I2 /
    /// the line-item invariant in §3) and by the tax-amount invariant
    /// (`tax_amount == round_half_up(line_total * rate / 100)`).
    pub fn round_half_up(value: f64) -> Self {
        Self(value.round() as i64)
    }

    /// Format as DIAN expects monetary fields: an integer part, a literal
    /// `.`, then exactly two decimal digits, no thousands separators.
    ///
    /// e.g. `MinorUnits(119000000).format_dian() == "1190000.00"` for a
    /// value stored in 1/100ths of the display unit (consistent with the
    /// worked example in §8 E1, where line totals are stored as `minor units
    /// 100000000` for a `1,000,000`-unit price).
    pub fn format_dian(self) -> String {
        let negative = self.0 < 0;
        let abs = self.0.unsigned_abs();
        // `self.0` stores hundredths of the DIAN-visible unit (the data
        // model's "minor units" are minor units of the minor unit, per the
        // E1 worked example: price 1,000,000 COP is stored as 100_000_000).
        let whole = abs / 100;
        let frac = abs % 100;
        let sign = if negative { "-" } else { "" };
        format!("{sign}{whole}.{frac:02}")
    }
}

impl Add for MinorUnits {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for MinorUnits {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_dian())
    }
}

impl std::iter::Sum for MinorUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// An ISO-4217 currency code, stored as its 3-letter code.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Currency(pub String);

impl Currency {
    pub const COP: &'static str = "COP";
    pub const USD: &'static str = "USD";

    /// Validate that `code` looks like an ISO-4217 alphabetic code (3
    /// uppercase ASCII letters). DIAN only actually accepts a small set in
    /// practice, but full catalog validation is an intake-layer concern
    /// (out of scope per §1).
    pub fn parse(code: &str) -> Result<Self, InvalidCurrency> {
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code.to_string()))
        } else {
            Err(InvalidCurrency(code.to_string()))
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid ISO-4217 currency code: {0:?}")]
pub struct InvalidCurrency(pub String);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn format_dian_matches_e1_worked_example() {
        assert_eq!(MinorUnits(100_000_000).format_dian(), "1000000.00");
        assert_eq!(MinorUnits(19_000_000).format_dian(), "190000.00");
        assert_eq!(MinorUnits(119_000_000).format_dian(), "1190000.00");
    }

    #[test]
    fn format_dian_handles_small_and_negative() {
        assert_eq!(MinorUnits(5).format_dian(), "0.05");
        assert_eq!(MinorUnits(-500).format_dian(), "-5.00");
        assert_eq!(MinorUnits(0).format_dian(), "0.00");
    }

    #[test]
    fn currency_parse_rejects_lowercase_and_wrong_length() {
        assert!(Currency::parse("COP").is_ok());
        assert!(Currency::parse("cop").is_err());
        assert!(Currency::parse("CO").is_err());
        assert!(Currency::parse("COPP").is_err());
    }

    #[test]
    fn round_half_up_rounds_ties_away_from_zero() {
        assert_eq!(MinorUnits::round_half_up(100.5).0, 101);
        assert_eq!(MinorUnits::round_half_up(100.4).0, 100);
    }
}
