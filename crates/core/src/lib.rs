//! MakanBar
//!
//! MakanBar core is the pure, synchronous cart, pricing and order engine
//! behind the MakanBar food-ordering application. It owns the catalog data
//! model, the in-memory cart ledger with its derived totals, the promo
//! discount policy and the linear order-placement flow. Nothing in this
//! crate performs I/O; the application layer lives in `makanbar-app`.

pub mod cart;
pub mod catalog;
pub mod fixtures;
pub mod order;
pub mod price;
pub mod promo;
pub mod receipt;
