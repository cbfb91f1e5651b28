//! Deep-index persistence (spec §4.3): a SQLite-backed relational store.

pub mod schema;
pub mod store;

pub use store::DeepIndexStore;
