//! Single-topic broadcast channels.
//!
//! A [`Topic`] is fire-and-forget: events published while nobody is
//! subscribed are dropped, and each subscriber sees events in publish order.
//! A [`ReplayTopic`] additionally keeps the latest event and hands it to
//! every new subscriber before any live event.

use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// One broadcast channel carrying a single event type.
pub struct Topic<E> {
    name: &'static str,
    sender: broadcast::Sender<E>,
}

impl<E: Clone + Debug> Topic<E> {
    /// Create a topic whose subscribers can fall at most `capacity` events
    /// behind before they start observing lag.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { name, sender }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Publish to every current subscriber and return how many there were.
    ///
    /// Never waits on subscribers and never fails; with zero subscribers the
    /// event is dropped.
    pub fn publish(&self, event: E) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(topic = self.name, ?event, "No subscribers, event dropped");
                0
            }
        }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> Subscription<E> {
        Subscription::new(self.name, self.sender.subscribe(), None)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

// ---------------------------------------------------------------------------
// ReplayTopic
// ---------------------------------------------------------------------------

/// A [`Topic`] that remembers its most recent event.
///
/// The slot and the channel are updated under one lock so a subscriber that
/// joins concurrently with a publish sees the event exactly once: either as
/// the replayed value or as a live delivery.
pub struct ReplayTopic<E> {
    topic: Topic<E>,
    last: Mutex<Option<E>>,
}

impl<E: Clone + Debug> ReplayTopic<E> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            topic: Topic::new(name, capacity),
            last: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.topic.name()
    }

    /// Store `event` as the latest value and broadcast it.
    pub fn publish(&self, event: E) -> usize {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        *last = Some(event.clone());
        self.topic.publish(event)
    }

    /// Subscribe; the latest event (if any) is delivered first.
    pub fn subscribe(&self) -> Subscription<E> {
        let last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        Subscription::new(self.topic.name, self.topic.sender.subscribe(), last.clone())
    }

    /// The latest published event, without subscribing.
    pub fn latest(&self) -> Option<E> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the latest event (e.g. on sign-out).
    pub fn reset(&self) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn subscriber_count(&self) -> usize {
        self.topic.subscriber_count()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A subscriber's handle on one topic. Dropping it unsubscribes.
pub struct Subscription<E> {
    topic: &'static str,
    receiver: broadcast::Receiver<E>,
    replay: Option<E>,
}

impl<E: Clone> Subscription<E> {
    fn new(topic: &'static str, receiver: broadcast::Receiver<E>, replay: Option<E>) -> Self {
        Self {
            topic,
            receiver,
            replay,
        }
    }

    pub fn topic(&self) -> &'static str {
        self.topic
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the bus has been dropped. If this subscriber fell
    /// behind, the skipped events are logged and delivery resumes with the
    /// oldest retained one.
    pub async fn recv(&mut self) -> Option<E> {
        if let Some(event) = self.replay.take() {
            return Some(event);
        }
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = self.topic, skipped, "Subscriber lagged, events skipped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<E> {
        if let Some(event) = self.replay.take() {
            return Some(event);
        }
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = self.topic, skipped, "Subscriber lagged, events skipped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
