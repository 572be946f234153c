//! Integration tests for the end-to-end order placement flow.

use testresult::TestResult;

use makanbar::{
    cart::Cart,
    fixtures,
    order::{self, Bank, OrderError, OrderStatus, PaymentMethod},
    price::Rupiah,
    promo::FlatPercentagePolicy,
};

#[test]
fn order_tracks_from_preparing_to_completion() -> TestResult {
    let policy = FlatPercentagePolicy::default();
    let items = fixtures::menu_items()?;
    let mut cart = Cart::new();

    cart.add_item(&items[1]);
    cart.set_promo_code("SELASA");

    let mut order = order::place_order(&mut cart, PaymentMethod::BankTransfer(Bank::Bca), &policy)?;

    // 50_500 + 10_000 - 5_050
    assert_eq!(order.receipt.total_amount, Rupiah::new(55_450));
    assert!(cart.is_empty());

    let mut statuses = vec![order.status];
    while !order.status.is_final() {
        order.advance();
        statuses.push(order.status);
    }

    assert_eq!(
        statuses,
        vec![
            OrderStatus::Preparing,
            OrderStatus::Delivering,
            OrderStatus::Delivered,
            OrderStatus::Completed,
        ]
    );

    Ok(())
}

#[test]
fn cart_is_reusable_after_an_order() -> TestResult {
    let policy = FlatPercentagePolicy::default();
    let items = fixtures::menu_items()?;
    let mut cart = Cart::new();

    cart.add_item(&items[0]);
    order::place_order(&mut cart, PaymentMethod::GoPay, &policy)?;

    // The same cart starts a fresh order with no leftover promo state.
    cart.add_item(&items[2]);
    let totals = cart.totals(&policy);

    assert_eq!(totals.item_total, Rupiah::new(45_500));
    assert_eq!(totals.promo_discount, Rupiah::ZERO);

    Ok(())
}

#[test]
fn an_abandoned_checkout_never_clears_the_cart() -> TestResult {
    let policy = FlatPercentagePolicy::default();
    let items = fixtures::menu_items()?;
    let mut cart = Cart::new();

    cart.add_item(&items[0]);

    // Placement is the only step that clears; failing to place (empty
    // cart elsewhere) or merely reviewing totals must not.
    let _reviewed = cart.totals(&policy);
    assert_eq!(cart.count(), 1);

    let mut other = Cart::new();
    assert_eq!(
        order::place_order(&mut other, PaymentMethod::Dana, &policy).unwrap_err(),
        OrderError::EmptyCart
    );
    assert_eq!(cart.count(), 1);

    Ok(())
}
