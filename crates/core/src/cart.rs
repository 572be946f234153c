//! Cart ledger
//!
//! The authoritative in-memory shopping cart. Mutations are synchronous and
//! infallible; every monetary figure is derived on read via
//! [`Cart::totals`], never stored.
//!
//! Invariants held after every operation:
//! - at most one line per item id,
//! - every line's quantity is greater than zero,
//! - lines keep their insertion order.

use smallvec::SmallVec;

use crate::{
    catalog::{ItemId, MenuItem},
    price::Rupiah,
    promo::PromoPolicy,
    receipt::Receipt,
};

/// Flat delivery fee charged on any non-empty cart.
pub const DELIVERY_FEE: Rupiah = Rupiah::new(10_000);

/// The fields of a [`MenuItem`] a cart line keeps.
///
/// A snapshot, not a live reference: catalog price changes after the item
/// was added never retroactively change a line's price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    /// Catalog identifier of the snapshotted item.
    pub id: ItemId,

    /// Name at the moment of adding.
    pub name: String,

    /// Unit price at the moment of adding.
    pub price: Rupiah,

    /// Image URI at the moment of adding.
    pub image: String,
}

impl From<&MenuItem> for ItemSnapshot {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            image: item.image.clone(),
        }
    }
}

/// One cart line: an item snapshot paired with a purchase quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// The snapshotted item.
    pub item: ItemSnapshot,

    /// Always greater than zero; a zero-quantity line is removed instead.
    pub quantity: u32,
}

impl CartLine {
    /// The line's contribution to the item total.
    #[must_use]
    pub fn line_total(&self) -> Rupiah {
        self.item.price.saturating_mul(self.quantity)
    }
}

/// The in-memory shopping cart.
///
/// Created empty at session start and explicitly owned by the caller; there
/// are no ambient singletons, so tests can instantiate isolated carts.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: SmallVec<[CartLine; 8]>,
    promo_code: Option<String>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `item`.
    ///
    /// Increments the quantity of an existing line for the same item id,
    /// otherwise appends a new line with quantity 1.
    pub fn add_item(&mut self, item: &MenuItem) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.item.id == item.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLine {
                item: ItemSnapshot::from(item),
                quantity: 1,
            });
        }
    }

    /// Removes the line for `item_id`; a no-op when absent.
    pub fn remove_item(&mut self, item_id: &ItemId) {
        self.lines.retain(|line| line.item.id != *item_id);
    }

    /// Replaces the quantity of the line for `item_id`.
    ///
    /// A quantity of zero removes the line entirely. Absent lines are left
    /// alone; this never creates a line.
    pub fn set_quantity(&mut self, item_id: &ItemId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(item_id);
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.item.id == *item_id) {
            line.quantity = quantity;
        }
    }

    /// Empties the cart and forgets the promo code.
    ///
    /// Idempotent; the order flow calls this exactly once at confirmation
    /// and a second call is harmless.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.promo_code = None;
    }

    /// Stores a free-text promo code. Whether it earns anything is decided
    /// by the [`PromoPolicy`] at totals time.
    pub fn set_promo_code(&mut self, code: impl Into<String>) {
        self.promo_code = Some(code.into());
    }

    /// Forgets the promo code.
    pub fn clear_promo_code(&mut self) {
        self.promo_code = None;
    }

    /// The stored promo code, if any.
    #[must_use]
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    /// Total number of units across all lines; badges the cart icon.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |total, line| total.saturating_add(line.quantity))
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn item_total(&self) -> Rupiah {
        self.lines
            .iter()
            .fold(Rupiah::ZERO, |total, line| {
                total.saturating_add(line.line_total())
            })
    }

    /// Derives the full set of totals under the given promo policy.
    #[must_use]
    pub fn totals(&self, policy: &dyn PromoPolicy) -> Receipt {
        let item_total = self.item_total();

        let delivery_fee = if item_total.is_zero() {
            Rupiah::ZERO
        } else {
            DELIVERY_FEE
        };

        let promo_discount = self
            .promo_code
            .as_deref()
            .and_then(|code| policy.discount_for(code, item_total))
            .unwrap_or(Rupiah::ZERO);

        let total_amount = item_total
            .saturating_add(delivery_fee)
            .saturating_sub(promo_discount);

        Receipt {
            item_total,
            delivery_fee,
            promo_discount,
            total_amount,
        }
    }
}
