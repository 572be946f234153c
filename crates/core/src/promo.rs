//! Promo code policy
//!
//! What counts as a valid promo code, and how big a discount it earns, is a
//! pluggable policy. The storefront ships with [`FlatPercentagePolicy`],
//! which reproduces the source system's placeholder rule: any non-empty
//! code earns a flat 10% off the item total. That rule is explicitly not a
//! production promotions system; a real deployment would implement
//! [`PromoPolicy`] against a server-side promo registry.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::price::Rupiah;

/// Decides whether a promo code is accepted and what it is worth.
pub trait PromoPolicy {
    /// Returns the discount earned by `code` against `item_total`, or
    /// `None` when the code is not accepted.
    fn discount_for(&self, code: &str, item_total: Rupiah) -> Option<Rupiah>;
}

/// Accepts any non-empty code for a fixed percentage off the item total.
///
/// Demo-only policy: there is no registry lookup and no server-side
/// validation behind it.
#[derive(Debug, Clone, Copy)]
pub struct FlatPercentagePolicy {
    percentage: Percentage,
}

impl FlatPercentagePolicy {
    /// Creates a policy with the given percentage.
    #[must_use]
    pub fn new(percentage: Percentage) -> Self {
        Self { percentage }
    }
}

impl Default for FlatPercentagePolicy {
    /// The storefront default: 10% off.
    fn default() -> Self {
        Self::new(Percentage::from(0.1))
    }
}

impl PromoPolicy for FlatPercentagePolicy {
    fn discount_for(&self, code: &str, item_total: Rupiah) -> Option<Rupiah> {
        if code.trim().is_empty() {
            return None;
        }

        percent_of(&self.percentage, item_total)
    }
}

/// Calculates a percentage of a rupiah amount, rounded half away from zero
/// to whole rupiah.
fn percent_of(percent: &Percentage, amount: Rupiah) -> Option<Rupiah> {
    let amount = Decimal::from_u64(amount.value())?;

    ((*percent) * Decimal::ONE)
        .checked_mul(amount)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .map(Rupiah::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_code_earns_nothing() {
        let policy = FlatPercentagePolicy::default();

        assert_eq!(policy.discount_for("", Rupiah::new(100_000)), None);
        assert_eq!(policy.discount_for("   ", Rupiah::new(100_000)), None);
    }

    #[test]
    fn any_non_empty_code_earns_ten_percent() {
        let policy = FlatPercentagePolicy::default();

        let discount = policy.discount_for("HEMAT", Rupiah::new(100_000));

        assert_eq!(discount, Some(Rupiah::new(10_000)));
    }

    #[test]
    fn discount_rounds_half_away_from_zero() {
        let policy = FlatPercentagePolicy::default();

        // 10% of 45 rupiah is 4.5, which rounds up to 5.
        let discount = policy.discount_for("HEMAT", Rupiah::new(45));

        assert_eq!(discount, Some(Rupiah::new(5)));
    }

    #[test]
    fn custom_percentage_applies() {
        let policy = FlatPercentagePolicy::new(Percentage::from(0.25));

        let discount = policy.discount_for("SELASA", Rupiah::new(80_000));

        assert_eq!(discount, Some(Rupiah::new(20_000)));
    }
}
