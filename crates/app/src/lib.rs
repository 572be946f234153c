//! MakanBar application layer.
//!
//! Wires the pure `makanbar` engine to a backend provider: the
//! session/identity store, the catalog store, the provider capability
//! traits with their Firebase REST implementation and the in-memory local
//! fallback, and the dependency-injected [`context::AppContext`].

pub mod backend;
pub mod catalog;
pub mod context;
pub mod session;
