//! Cross-feature event bus for the collection client.
//!
//! - [`EventBus`] — one independent broadcast [`Topic`] per event kind.
//! - [`events`] — the typed event values carried by each topic.
//! - [`ReplayTopic`] — a topic that redelivers its latest event to late
//!   subscribers (used for the currently equipped inventory).
//! - [`spawn_listener`] — a cancellable subscription loop for feature
//!   services.

pub mod bus;
pub mod events;
pub mod listener;
pub mod topic;

pub use bus::EventBus;
pub use listener::spawn_listener;
pub use topic::{ReplayTopic, Subscription, Topic};
