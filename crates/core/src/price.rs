//! Rupiah amounts

use std::fmt;

use rusty_money::{Money, iso};
use serde::{Deserialize, Serialize};

/// A whole-rupiah amount.
///
/// The Indonesian rupiah has no subunit in practice, so every monetary
/// value in the workspace is an exact integer number of rupiah. Formatting
/// goes through [`rusty_money`] so amounts render the way the storefront
/// shows them ("Rp40.000,00").
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rupiah(u64);

impl Rupiah {
    /// Zero rupiah.
    pub const ZERO: Self = Self(0);

    /// Creates a new amount from whole rupiah.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the amount in whole rupiah.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns `true` for a zero amount.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts an amount, saturating at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiplies the amount by a quantity, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }
}

impl From<u64> for Rupiah {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Rupiah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match i64::try_from(self.0) {
            Ok(major) => fmt::Display::fmt(&Money::from_major(major, iso::IDR), f),
            // Out of range for the formatter; fall back to a plain figure.
            Err(_) => write!(f, "Rp{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_mul_by_quantity() {
        let price = Rupiah::new(40_000);

        assert_eq!(price.saturating_mul(2), Rupiah::new(80_000));
    }

    #[test]
    fn saturating_sub_stops_at_zero() {
        let fee = Rupiah::new(10_000);

        assert_eq!(fee.saturating_sub(Rupiah::new(25_000)), Rupiah::ZERO);
    }

    #[test]
    fn formats_as_rupiah() {
        let price = Rupiah::new(40_000);

        let formatted = price.to_string();

        assert!(formatted.starts_with("Rp"), "got {formatted}");
        assert!(formatted.contains("40"), "got {formatted}");
    }
}
