//! Shared entity cache with a freshness window.
//!
//! One [`EntityCache`] is constructed by the composition root and shared by
//! every view that lists entities. State is published through a
//! [`tokio::sync::watch`] channel: each mutation swaps in a new immutable
//! [`CacheState`], so readers take a snapshot and never hold a lock.
//!
//! Two predicates are kept apart on purpose:
//!
//! - [`EntityCache::has_data`]: non-empty, regardless of age. Enough to
//!   render immediately.
//! - [`EntityCache::is_cache_valid`]: non-empty and younger than the TTL.
//!   When false, a background refresh should be issued.
//!
//! Fetches run without holding anything, so a fetch may land after a newer
//! local write. A fetch takes a [`LoadTicket`] when it starts and installs
//! its result through [`EntityCache::complete_load`]: flags written locally
//! since the ticket was taken win over the fetched ones, and a fetch that
//! started before [`EntityCache::clear`] is dropped.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dexquest_core::entity::{generation_range, Pokemon};
use dexquest_core::types::{DbId, Timestamp};
use tokio::sync::watch;

use crate::clock::Clock;

/// Default time-to-live: 10 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// An immutable snapshot of the cache.
///
/// `entities` is ordered by id. Records that did not change between two
/// snapshots are the same `Arc`, so consumers can diff by pointer.
#[derive(Debug, Clone, Default)]
pub struct CacheState {
    pub entities: Arc<Vec<Arc<Pokemon>>>,
    pub last_loaded_at: Option<Timestamp>,
    pub is_loading: bool,
    pub is_initialized: bool,
    /// Bumped by every write to entities or flags.
    pub revision: u64,
    /// Bumped by [`EntityCache::clear`].
    pub epoch: u64,
}

impl CacheState {
    pub fn has_data(&self) -> bool {
        !self.entities.is_empty()
    }
}

/// Cache position a fetch started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    revision: u64,
    epoch: u64,
}

/// Process-wide entity cache.
pub struct EntityCache {
    state: watch::Sender<CacheState>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl EntityCache {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        let (state, _) = watch::channel(CacheState::default());
        Self { state, clock, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Observe every state change.
    pub fn subscribe(&self) -> watch::Receiver<CacheState> {
        self.state.subscribe()
    }

    /// The current state.
    pub fn snapshot(&self) -> CacheState {
        self.state.borrow().clone()
    }

    pub fn entities(&self) -> Arc<Vec<Arc<Pokemon>>> {
        Arc::clone(&self.state.borrow().entities)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().is_initialized
    }

    // ---- Freshness ----

    /// Non-empty and loaded less than one TTL ago.
    pub fn is_cache_valid(&self) -> bool {
        let state = self.state.borrow();
        if state.entities.is_empty() {
            return false;
        }
        let Some(loaded_at) = state.last_loaded_at else {
            return false;
        };
        // A clock that moved backwards yields a negative age; treat as fresh.
        match self.clock.now().signed_duration_since(loaded_at).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        }
    }

    /// Non-empty, regardless of age.
    pub fn has_data(&self) -> bool {
        self.state.borrow().has_data()
    }

    // ---- Mutation ----

    /// Replace every entity and stamp the load time.
    pub fn update_cache(&self, entities: Vec<Pokemon>) {
        let entities = sorted(entities);
        let now = self.clock.now();

        self.state.send_modify(|state| install(state, entities, now));
        tracing::debug!(count = self.state.borrow().entities.len(), "Entity cache replaced");
    }

    /// Mark the start of a fetch whose result goes to [`Self::complete_load`].
    pub fn begin_load(&self) -> LoadTicket {
        let state = self.state.borrow();
        LoadTicket {
            revision: state.revision,
            epoch: state.epoch,
        }
    }

    /// Install entities fetched under `ticket`.
    ///
    /// Returns false, leaving the cache untouched, when the cache was cleared
    /// after the ticket was taken. Entities whose flags were written after
    /// the ticket keep the cached flags.
    pub fn complete_load(&self, ticket: LoadTicket, entities: Vec<Pokemon>) -> bool {
        let mut entities = sorted(entities);
        let now = self.clock.now();

        let installed = self.state.send_if_modified(|state| {
            if state.epoch != ticket.epoch {
                return false;
            }
            if state.revision != ticket.revision {
                for p in &mut entities {
                    if let Ok(i) = state.entities.binary_search_by_key(&p.id, |c| c.id) {
                        let local = &state.entities[i];
                        if local.is_caught != p.is_caught || local.is_favorite != p.is_favorite {
                            *p = Arc::new(
                                p.with_caught(local.is_caught)
                                    .with_favorite(local.is_favorite),
                            );
                        }
                    }
                }
                tracing::debug!("Kept local flags written during fetch");
            }
            install(state, entities, now);
            true
        });
        if !installed {
            tracing::debug!("Discarded fetch started before the cache was cleared");
        }
        installed
    }

    /// Clear the loading flag after a failed fetch under `ticket`.
    pub fn abort_load(&self, ticket: LoadTicket) {
        self.state.send_if_modified(|state| {
            if state.epoch != ticket.epoch || !state.is_loading {
                return false;
            }
            state.is_loading = false;
            true
        });
    }

    /// Set the loading flag; returns false when it already had that value.
    pub fn set_loading(&self, loading: bool) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_loading == loading {
                return false;
            }
            state.is_loading = loading;
            true
        })
    }

    /// Set one entity's caught flag. Unknown ids are ignored.
    pub fn update_caught_state(&self, id: DbId, is_caught: bool) {
        self.replace_one(id, |p| (p.is_caught != is_caught).then(|| p.with_caught(is_caught)));
    }

    /// Set one entity's favorite flag. Unknown ids are ignored.
    pub fn update_favorite_state(&self, id: DbId, is_favorite: bool) {
        self.replace_one(id, |p| {
            (p.is_favorite != is_favorite).then(|| p.with_favorite(is_favorite))
        });
    }

    /// Recompute both flags of every entity from set membership.
    ///
    /// Prior flags are not merged: an id absent from `caught_ids` ends up
    /// uncaught. Unchanged records keep their `Arc`.
    pub fn update_states(&self, caught_ids: &HashSet<DbId>, favorite_ids: &HashSet<DbId>) {
        self.state.send_if_modified(|state| {
            let mut changed = 0usize;
            let next: Vec<Arc<Pokemon>> = state
                .entities
                .iter()
                .map(|p| {
                    let caught = caught_ids.contains(&p.id);
                    let favorite = favorite_ids.contains(&p.id);
                    if p.is_caught == caught && p.is_favorite == favorite {
                        Arc::clone(p)
                    } else {
                        changed += 1;
                        Arc::new(p.with_caught(caught).with_favorite(favorite))
                    }
                })
                .collect();

            if changed == 0 {
                return false;
            }
            tracing::debug!(changed, "Entity flags resynced");
            state.entities = Arc::new(next);
            state.revision += 1;
            true
        });
    }

    /// Expire the cache without dropping the entities.
    pub fn invalidate(&self) {
        self.state.send_if_modified(|state| state.last_loaded_at.take().is_some());
    }

    /// Full reset, used when the signed-in user changes.
    pub fn clear(&self) {
        self.state.send_modify(|state| {
            *state = CacheState {
                revision: state.revision + 1,
                epoch: state.epoch + 1,
                ..CacheState::default()
            };
        });
    }

    // ---- Lookup ----

    pub fn get_pokemon(&self, id: DbId) -> Option<Arc<Pokemon>> {
        let state = self.state.borrow();
        state
            .entities
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| Arc::clone(&state.entities[i]))
    }

    /// Entities with `lo <= id <= hi`, in cache order.
    pub fn get_range(&self, lo: DbId, hi: DbId) -> Vec<Arc<Pokemon>> {
        self.state
            .borrow()
            .entities
            .iter()
            .filter(|p| (lo..=hi).contains(&p.id))
            .cloned()
            .collect()
    }

    /// Entities introduced in `generation`; empty for unknown generations.
    pub fn get_generation(&self, generation: u8) -> Vec<Arc<Pokemon>> {
        generation_range(generation)
            .map(|(lo, hi)| self.get_range(lo, hi))
            .unwrap_or_default()
    }

    fn replace_one(&self, id: DbId, update: impl FnOnce(&Pokemon) -> Option<Pokemon>) {
        self.state.send_if_modified(|state| {
            let Ok(index) = state.entities.binary_search_by_key(&id, |p| p.id) else {
                return false;
            };
            let Some(replacement) = update(&state.entities[index]) else {
                return false;
            };
            let mut next = state.entities.as_ref().clone();
            next[index] = Arc::new(replacement);
            state.entities = Arc::new(next);
            state.revision += 1;
            true
        });
    }
}

fn sorted(mut entities: Vec<Pokemon>) -> Vec<Arc<Pokemon>> {
    entities.sort_by_key(|p| p.id);
    entities.dedup_by_key(|p| p.id);
    entities.into_iter().map(Arc::new).collect()
}

fn install(state: &mut CacheState, entities: Vec<Arc<Pokemon>>, now: Timestamp) {
    state.entities = Arc::new(entities);
    state.last_loaded_at = Some(now);
    state.is_loading = false;
    state.is_initialized = true;
    state.revision += 1;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::clock::ManualClock;

    use super::*;

    fn mon(id: DbId) -> Pokemon {
        Pokemon::new(id, format!("mon-{id}"), vec!["normal".into()]).unwrap()
    }

    fn cache_with(clock: &Arc<ManualClock>, ids: &[DbId]) -> EntityCache {
        let cache = EntityCache::new(Arc::clone(clock) as Arc<dyn Clock>, DEFAULT_TTL);
        cache.update_cache(ids.iter().copied().map(mon).collect());
        cache
    }

    #[test]
    fn empty_cache_is_neither_valid_nor_populated() {
        let cache = EntityCache::new(Arc::new(ManualClock::default()), DEFAULT_TTL);
        assert!(!cache.is_cache_valid());
        assert!(!cache.has_data());
        assert!(!cache.is_initialized());
    }

    #[test]
    fn ttl_boundary() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[1]);
        assert!(cache.is_cache_valid());

        clock.advance(chrono::Duration::seconds(599));
        assert!(cache.is_cache_valid());

        clock.advance(chrono::Duration::seconds(1));
        assert!(!cache.is_cache_valid());
        assert!(cache.has_data());
    }

    #[test]
    fn empty_update_initializes_but_is_not_valid() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[]);
        assert!(cache.is_initialized());
        assert!(!cache.is_cache_valid());
    }

    #[test]
    fn update_cache_orders_by_id_and_clears_loading() {
        let clock = Arc::new(ManualClock::default());
        let cache = EntityCache::new(Arc::clone(&clock) as Arc<dyn Clock>, DEFAULT_TTL);
        assert!(cache.set_loading(true));
        assert!(!cache.set_loading(true));
        cache.update_cache(vec![mon(3), mon(1), mon(2)]);

        let ids: Vec<_> = cache.entities().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!cache.is_loading());
    }

    #[test]
    fn single_update_swaps_only_the_target() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[1, 2]);
        let before = cache.entities();

        cache.update_caught_state(2, true);
        let after = cache.entities();

        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert!(!Arc::ptr_eq(&before[1], &after[1]));
        assert!(after[1].is_caught);
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[1]);
        let before = cache.entities();

        cache.update_favorite_state(99, true);
        assert!(Arc::ptr_eq(&before, &cache.entities()));
    }

    #[test]
    fn update_states_recomputes_flags() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[1, 2, 3]);
        cache.update_caught_state(3, true);

        let caught = HashSet::from([1]);
        let favorites = HashSet::from([2]);
        cache.update_states(&caught, &favorites);

        let flags: Vec<_> = cache
            .entities()
            .iter()
            .map(|p| (p.is_caught, p.is_favorite))
            .collect();
        assert_eq!(flags, vec![(true, false), (false, true), (false, false)]);
    }

    #[test]
    fn invalidate_keeps_entities() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[1]);
        cache.invalidate();
        assert!(!cache.is_cache_valid());
        assert!(cache.has_data());
    }

    #[test]
    fn clear_resets_everything() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[1]);
        cache.clear();
        let state = cache.snapshot();
        assert!(!state.has_data());
        assert!(state.last_loaded_at.is_none());
        assert!(!state.is_initialized);
    }

    #[test]
    fn fetch_keeps_flags_written_while_it_ran() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[1, 2, 3]);

        let ticket = cache.begin_load();
        cache.update_caught_state(2, true);
        cache.update_favorite_state(3, true);
        assert!(cache.complete_load(ticket, vec![mon(1), mon(2), mon(3), mon(4)]));

        let flags: Vec<_> = cache
            .entities()
            .iter()
            .map(|p| (p.id, p.is_caught, p.is_favorite))
            .collect();
        assert_eq!(
            flags,
            vec![(1, false, false), (2, true, false), (3, false, true), (4, false, false)]
        );
    }

    #[test]
    fn undisturbed_fetch_takes_fetched_flags() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[1]);
        cache.update_caught_state(1, true);

        let ticket = cache.begin_load();
        assert!(cache.complete_load(ticket, vec![mon(1)]));
        assert!(!cache.get_pokemon(1).unwrap().is_caught);
    }

    #[test]
    fn fetch_from_before_clear_is_dropped() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[1]);

        let ticket = cache.begin_load();
        cache.clear();
        assert!(cache.set_loading(true));
        assert!(!cache.complete_load(ticket, vec![mon(1), mon(2)]));
        cache.abort_load(ticket);

        assert!(!cache.has_data());
        assert!(cache.is_loading());
    }

    #[test]
    fn range_and_generation_lookup() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[1, 151, 152, 251, 252]);

        let ids = |v: Vec<Arc<Pokemon>>| v.iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids(cache.get_range(151, 251)), vec![151, 152, 251]);
        assert_eq!(ids(cache.get_generation(2)), vec![152, 251]);
        assert!(cache.get_generation(42).is_empty());
        assert_eq!(cache.get_pokemon(252).map(|p| p.id), Some(252));
        assert!(cache.get_pokemon(7).is_none());
    }

    #[test]
    fn subscribers_see_changes() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(&clock, &[1]);
        let mut rx = cache.subscribe();

        cache.update_caught_state(1, true);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().entities[0].is_caught);

        cache.update_caught_state(1, true);
        assert!(!rx.has_changed().unwrap());
    }
}
