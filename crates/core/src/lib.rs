//! Pure domain types and derivations for the collection client.
//!
//! Nothing in this crate performs I/O. Reconciliation, counter derivation
//! and color parsing are total functions over pre-loaded data; the caller
//! is responsible for fetching that data from the store.

pub mod entity;
pub mod error;
pub mod missions;
pub mod profile;
pub mod shop;
pub mod theme;
pub mod types;
