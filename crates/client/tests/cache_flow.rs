mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use dexquest_client::error::ClientError;
use dexquest_client::session::Session;
use dexquest_db::StoreError;
use tokio_util::sync::CancellationToken;

use common::{build_state, seeded_store, USER_ID};

fn ten_minutes() -> chrono::Duration {
    chrono::Duration::minutes(10)
}

#[tokio::test]
async fn first_load_waits_for_fetch_and_stamps_cache() {
    let store = Arc::new(seeded_store(0));
    let (state, _clock) = build_state(store, Session::signed_in(USER_ID));

    let entities = state.collection.load().await.unwrap();

    assert_eq!(entities.len(), 10);
    assert!(state.cache.is_cache_valid());
    assert!(state.cache.is_initialized());
    assert!(!state.cache.is_loading());
}

#[tokio::test]
async fn ttl_expiry_keeps_data_servable() {
    let store = Arc::new(seeded_store(0));
    let (state, clock) = build_state(store, Session::signed_in(USER_ID));
    state.collection.load().await.unwrap();

    clock.advance(ten_minutes() - chrono::Duration::seconds(1));
    assert!(state.cache.is_cache_valid());

    clock.advance(chrono::Duration::seconds(1));
    assert!(!state.cache.is_cache_valid());
    assert!(state.cache.has_data());
}

#[tokio::test]
async fn expired_cache_serves_stale_when_store_is_offline() {
    let store = Arc::new(seeded_store(0));
    let (state, clock) = build_state(Arc::clone(&store), Session::signed_in(USER_ID));
    state.collection.load().await.unwrap();
    state.collection.collect(3).await.unwrap();

    clock.advance(ten_minutes());
    store.set_offline(true);

    let served = state.collection.load().await.unwrap();
    assert_eq!(served.len(), 10);

    let mut rx = state.cache.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| !s.is_loading))
        .await
        .unwrap()
        .unwrap();

    // Last-known-good state survives the failed refresh.
    assert!(state.cache.get_pokemon(3).unwrap().is_caught);
    assert!(!state.cache.is_cache_valid());
}

#[tokio::test]
async fn empty_cache_surfaces_transient_error() {
    let store = Arc::new(seeded_store(0));
    store.set_offline(true);
    let (state, _clock) = build_state(store, Session::signed_in(USER_ID));

    let err = state.collection.load().await.unwrap_err();
    assert!(err.is_transient());
    assert_matches!(err, ClientError::Store(StoreError::Network(_)));
    assert!(!state.cache.is_loading());
    assert!(!state.cache.is_initialized());
}

#[tokio::test]
async fn expired_cache_refreshes_in_background() {
    let store = Arc::new(seeded_store(0));
    let (state, clock) = build_state(Arc::clone(&store), Session::signed_in(USER_ID));
    state.collection.load().await.unwrap();
    let stamped = state.cache.snapshot().last_loaded_at;

    clock.advance(ten_minutes());
    state.collection.load().await.unwrap();

    let mut rx = state.cache.subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| s.last_loaded_at != stamped && !s.is_loading),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(state.cache.is_cache_valid());
}

#[tokio::test]
async fn batch_resync_is_idempotent() {
    let store = Arc::new(seeded_store(0));
    let (state, _clock) = build_state(store, Session::signed_in(USER_ID));
    state.collection.load().await.unwrap();

    let caught = HashSet::from([1, 2, 5]);
    let favorites = HashSet::from([2]);

    state.cache.update_states(&caught, &favorites);
    let first: Vec<_> = state.cache.entities().iter().map(|p| (**p).clone()).collect();
    state.cache.update_states(&caught, &favorites);
    let second: Vec<_> = state.cache.entities().iter().map(|p| (**p).clone()).collect();

    assert_eq!(first, second);
    assert_eq!(first.iter().filter(|p| p.is_caught).count(), 3);
}

#[tokio::test]
async fn resync_applies_store_flags() {
    let store = Arc::new(seeded_store(0));
    let (state, _clock) = build_state(Arc::clone(&store), Session::signed_in(USER_ID));
    state.collection.load().await.unwrap();

    state.collection.set_favorite(4, true).await.unwrap();
    state.cache.update_states(&HashSet::new(), &HashSet::new());
    assert!(!state.cache.get_pokemon(4).unwrap().is_favorite);

    state.collection.resync_states().await.unwrap();
    assert!(state.cache.get_pokemon(4).unwrap().is_favorite);
}

#[tokio::test]
async fn refresh_request_invalidates_and_reloads() {
    let store = Arc::new(seeded_store(0));
    let (state, clock) = build_state(store, Session::signed_in(USER_ID));
    state.collection.load().await.unwrap();
    let stamped = state.cache.snapshot().last_loaded_at;

    let cancel = CancellationToken::new();
    let listeners = state.spawn_listeners(&cancel);

    clock.advance(chrono::Duration::seconds(30));
    let mut rx = state.cache.subscribe();
    state.bus.request_refresh();

    tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| s.last_loaded_at.is_some() && s.last_loaded_at != stamped),
    )
    .await
    .unwrap()
    .unwrap();

    cancel.cancel();
    for handle in listeners {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn sign_out_clears_cache() {
    let store = Arc::new(seeded_store(0));
    let (state, _clock) = build_state(store, Session::signed_in(USER_ID));
    state.collection.load().await.unwrap();

    let guest = state.switch_session(Session::Guest);

    assert!(!guest.cache.has_data());
    assert!(!guest.cache.is_initialized());
    assert!(guest.session.is_guest());
}
