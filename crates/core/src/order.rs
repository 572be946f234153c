//! Order placement flow
//!
//! Checkout is a strictly linear sequence: a populated cart is reviewed, a
//! payment method is selected and confirmed, the cart is cleared, and the
//! order is tracked to completion. Payment itself is simulated locally;
//! there is no gateway integration.

use std::fmt;

use jiff::Timestamp;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    cart::{Cart, CartLine},
    promo::PromoPolicy,
    receipt::Receipt,
};

/// Errors raised while placing an order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The cart had no lines to order.
    #[error("cannot place an order from an empty cart")]
    EmptyCart,
}

/// Banks accepted for transfer payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    /// Bank Central Asia.
    Bca,
    /// Bank Negara Indonesia.
    Bni,
    /// Bank Republik Indonesia.
    Bri,
    /// Bank Mandiri.
    Mandiri,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Transfer to one of the accepted banks.
    BankTransfer(Bank),
    /// GoPay e-wallet.
    GoPay,
    /// DANA e-wallet.
    Dana,
    /// QRIS code scan.
    Qris,
}

/// Delivery progress of a placed order.
///
/// Advances strictly forward and saturates at [`OrderStatus::Completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderStatus {
    /// The kitchen is preparing the order.
    Preparing,
    /// A courier is on the way.
    Delivering,
    /// The order has arrived.
    Delivered,
    /// The customer confirmed receipt.
    Completed,
}

impl OrderStatus {
    /// The next status in the progression; `Completed` stays put.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Preparing => Self::Delivering,
            Self::Delivering => Self::Delivered,
            Self::Delivered | Self::Completed => Self::Completed,
        }
    }

    /// Whether the order has reached its final status.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Preparing => "preparing",
            Self::Delivering => "delivering",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
        };

        f.write_str(label)
    }
}

/// A confirmed order: a snapshot of the cart it was placed from.
#[derive(Debug, Clone)]
pub struct Order {
    /// Opaque order identifier.
    pub id: String,

    /// Lines at the moment of placement.
    pub lines: Vec<CartLine>,

    /// Totals at the moment of placement.
    pub receipt: Receipt,

    /// Selected payment method.
    pub payment_method: PaymentMethod,

    /// Current delivery progress.
    pub status: OrderStatus,

    /// When the order was confirmed.
    pub placed_at: Timestamp,
}

impl Order {
    /// Advances delivery progress by one step.
    pub fn advance(&mut self) {
        self.status = self.status.next();
    }
}

/// Confirms an order from the cart and clears it.
///
/// The cart is cleared exactly once, here, at the moment of confirmation;
/// [`Cart::clear`] is idempotent so a stray second clear is harmless.
///
/// # Errors
///
/// Returns [`OrderError::EmptyCart`] when the cart has no lines, leaving
/// the cart untouched.
pub fn place_order(
    cart: &mut Cart,
    payment_method: PaymentMethod,
    policy: &dyn PromoPolicy,
) -> Result<Order, OrderError> {
    if cart.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let order = Order {
        id: Uuid::now_v7().to_string(),
        lines: cart.lines().to_vec(),
        receipt: cart.totals(policy),
        payment_method,
        status: OrderStatus::Preparing,
        placed_at: Timestamp::now(),
    };

    cart.clear();

    Ok(order)
}

#[cfg(test)]
mod tests {
    use crate::{
        catalog::{ItemId, MenuItem},
        price::Rupiah,
        promo::FlatPercentagePolicy,
    };

    use super::*;

    fn pizza() -> MenuItem {
        MenuItem {
            id: ItemId::from("1"),
            name: "Pizza mozzarella".to_owned(),
            price: Rupiah::new(40_000),
            category: "Pizza".to_owned(),
            description: String::new(),
            image: String::new(),
            ingredients: Vec::new(),
            popular: true,
        }
    }

    #[test]
    fn placing_an_order_snapshots_totals_and_clears_the_cart() {
        let policy = FlatPercentagePolicy::default();
        let mut cart = Cart::new();
        cart.add_item(&pizza());
        cart.add_item(&pizza());

        let order =
            place_order(&mut cart, PaymentMethod::GoPay, &policy).expect("cart is populated");

        assert_eq!(order.receipt.total_amount, Rupiah::new(90_000));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.status, OrderStatus::Preparing);
        assert!(cart.is_empty());
        assert_eq!(cart.promo_code(), None);
    }

    #[test]
    fn placing_from_an_empty_cart_fails_and_changes_nothing() {
        let policy = FlatPercentagePolicy::default();
        let mut cart = Cart::new();

        let result = place_order(&mut cart, PaymentMethod::Qris, &policy);

        assert_eq!(result.unwrap_err(), OrderError::EmptyCart);
        assert!(cart.is_empty());
    }

    #[test]
    fn double_placement_fails_the_second_time() {
        let policy = FlatPercentagePolicy::default();
        let mut cart = Cart::new();
        cart.add_item(&pizza());

        let first = place_order(&mut cart, PaymentMethod::BankTransfer(Bank::Bca), &policy);
        let second = place_order(&mut cart, PaymentMethod::BankTransfer(Bank::Bca), &policy);

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), OrderError::EmptyCart);
    }

    #[test]
    fn status_progression_is_linear_and_saturates() {
        let mut status = OrderStatus::Preparing;

        status = status.next();
        assert_eq!(status, OrderStatus::Delivering);
        status = status.next();
        assert_eq!(status, OrderStatus::Delivered);
        status = status.next();
        assert_eq!(status, OrderStatus::Completed);
        status = status.next();
        assert_eq!(status, OrderStatus::Completed);
        assert!(status.is_final());
    }
}
