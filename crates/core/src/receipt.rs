//! Receipt

use crate::price::Rupiah;

/// Derived totals for a cart, and the pricing half of a placed order.
///
/// Computed fresh on every read from the cart's lines and promo code; the
/// cart never stores these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Sum of line price times quantity over all lines.
    pub item_total: Rupiah,

    /// Flat delivery fee; zero for an empty cart.
    pub delivery_fee: Rupiah,

    /// Discount earned by the cart's promo code, if any was accepted.
    pub promo_discount: Rupiah,

    /// `item_total + delivery_fee - promo_discount`.
    pub total_amount: Rupiah,
}

impl Receipt {
    /// A receipt for an empty cart: all figures zero.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            item_total: Rupiah::ZERO,
            delivery_fee: Rupiah::ZERO,
            promo_discount: Rupiah::ZERO,
            total_amount: Rupiah::ZERO,
        }
    }

    /// The amount saved against paying full price.
    #[must_use]
    pub const fn savings(&self) -> Rupiah {
        self.promo_discount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_receipt_is_all_zero() {
        let receipt = Receipt::empty();

        assert_eq!(receipt.item_total, Rupiah::ZERO);
        assert_eq!(receipt.delivery_fee, Rupiah::ZERO);
        assert_eq!(receipt.promo_discount, Rupiah::ZERO);
        assert_eq!(receipt.total_amount, Rupiah::ZERO);
    }

    #[test]
    fn savings_equal_the_promo_discount() {
        let receipt = Receipt {
            item_total: Rupiah::new(100_000),
            delivery_fee: Rupiah::new(10_000),
            promo_discount: Rupiah::new(10_000),
            total_amount: Rupiah::new(100_000),
        };

        assert_eq!(receipt.savings(), Rupiah::new(10_000));
    }
}
