//! Catalog store

mod errors;
mod models;
mod store;

pub use errors::*;
pub use models::*;
pub use store::*;
