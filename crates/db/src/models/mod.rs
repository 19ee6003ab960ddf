//! Row types returned by the repositories.
//!
//! Rows mirror table columns; `TryFrom` conversions map them onto the
//! `dexquest-core` domain types and reject values the domain cannot hold.

pub mod mission;
pub mod pokemon;
pub mod profile;
pub mod shop;
