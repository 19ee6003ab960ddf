//! Client-side state services for the collection app.
//!
//! [`AppState`](state::AppState) is the composition root: it constructs the
//! shared [`EntityCache`](cache::EntityCache) and
//! [`EventBus`](dexquest_events::EventBus) once and hands references to each
//! feature service. Services coordinate only through those two objects.

pub mod cache;
pub mod clock;
pub mod collection;
pub mod config;
pub mod demo;
pub mod error;
pub mod missions;
pub mod notifications;
pub mod profile;
pub mod session;
pub mod shop;
pub mod state;
pub mod teams;
