//! Transient, dismissible notifications.
//!
//! Only one notice is visible at a time. [`Notifier::show`] replaces the
//! current one and schedules it to clear after the display window; the
//! timer of a replaced notice does nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dexquest_core::types::Timestamp;
use tokio::sync::watch;

use crate::clock::Clock;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub is_error: bool,
    pub shown_at: Timestamp,
}

#[derive(Clone)]
pub struct Notifier {
    current: Arc<watch::Sender<Option<Notice>>>,
    next_id: Arc<AtomicU64>,
    clock: Arc<dyn Clock>,
    display_for: Duration,
}

impl Notifier {
    pub fn new(clock: Arc<dyn Clock>, display_for: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            next_id: Arc::new(AtomicU64::new(1)),
            clock,
            display_for,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notice>> {
        self.current.subscribe()
    }

    pub fn current(&self) -> Option<Notice> {
        self.current.borrow().clone()
    }

    /// Show an informational message.
    pub fn show(&self, message: impl Into<String>) -> u64 {
        self.push(message.into(), false)
    }

    /// Show the user-facing message for a failed operation.
    pub fn error(&self, err: &ClientError) -> u64 {
        self.push(err.user_message(), true)
    }

    /// Hide notice `id` if it is still showing.
    pub fn dismiss(&self, id: u64) {
        self.current.send_if_modified(|current| {
            if current.as_ref().is_some_and(|n| n.id == id) {
                *current = None;
                return true;
            }
            false
        });
    }

    fn push(&self, message: String, is_error: bool) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.current.send_replace(Some(Notice {
            id,
            message,
            is_error,
            shown_at: self.clock.now(),
        }));

        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.display_for).await;
            this.dismiss(id);
        });
        id
    }
}
