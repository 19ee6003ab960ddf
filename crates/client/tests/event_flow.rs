mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use dexquest_client::error::ClientError;
use dexquest_client::session::Session;
use dexquest_core::profile::EquipCategory;
use dexquest_events::events::{CollectionEvent, InventoryEquipChanged, ProgressTrigger};

use common::{build_state, seeded_store, USER_ID};

#[tokio::test]
async fn late_inventory_subscriber_gets_the_last_equip() {
    let store = Arc::new(seeded_store(500));
    let (state, _clock) = build_state(store, Session::signed_in(USER_ID));

    state.shop.purchase_item(1).await.unwrap();
    state
        .shop
        .equip_item(EquipCategory::Theme, "Volcano Theme")
        .await
        .unwrap();

    let mut late_inventory = state.bus.inventory().subscribe();
    let mut late_purchases = state.bus.purchases().subscribe();

    assert_eq!(
        late_inventory.try_recv(),
        Some(InventoryEquipChanged {
            category: EquipCategory::Theme,
            item_name: "Volcano Theme".to_string(),
        })
    );
    assert!(late_inventory.try_recv().is_none());
    assert!(late_purchases.try_recv().is_none());
}

#[tokio::test]
async fn switching_session_forgets_replayed_equip() {
    let store = Arc::new(seeded_store(500));
    let (state, _clock) = build_state(store, Session::signed_in(USER_ID));
    state.shop.purchase_item(1).await.unwrap();
    state
        .shop
        .equip_item(EquipCategory::Theme, "Volcano Theme")
        .await
        .unwrap();

    let guest = state.switch_session(Session::Guest);

    assert!(guest.bus.inventory().latest().is_none());
    assert!(guest.bus.inventory().subscribe().try_recv().is_none());
}

#[tokio::test]
async fn catching_emits_collection_then_progress() {
    let store = Arc::new(seeded_store(0));
    let (state, _clock) = build_state(store, Session::signed_in(USER_ID));
    state.collection.load().await.unwrap();

    let mut collection = state.bus.collection().subscribe();
    let mut progress = state.bus.mission_progress().subscribe();

    state.collection.collect(7).await.unwrap();

    assert_eq!(
        collection.try_recv(),
        Some(CollectionEvent::Caught { pokemon_id: 7 })
    );
    assert_eq!(
        progress.try_recv().map(|e| e.trigger),
        Some(ProgressTrigger::Collection)
    );
}

#[tokio::test]
async fn favoriting_emits_favorite_and_progress() {
    let store = Arc::new(seeded_store(0));
    let (state, _clock) = build_state(store, Session::signed_in(USER_ID));
    state.collection.load().await.unwrap();

    let mut favorites = state.bus.favorites().subscribe();
    let mut progress = state.bus.mission_progress().subscribe();

    state.collection.set_favorite(2, true).await.unwrap();

    assert!(favorites.try_recv().is_some_and(|e| e.pokemon_id == 2 && e.is_favorite));
    assert_eq!(
        progress.try_recv().map(|e| e.trigger),
        Some(ProgressTrigger::Favorite)
    );
    assert!(state.cache.get_pokemon(2).unwrap().is_favorite);
}

#[tokio::test]
async fn guest_mode_rejects_user_scoped_actions() {
    let store = Arc::new(seeded_store(500));
    let (state, _clock) = build_state(store, Session::Guest);

    assert_eq!(state.collection.load().await.unwrap().len(), 10);
    assert_eq!(state.shop.list_items().await.unwrap().len(), 1);

    assert_matches!(
        state.shop.purchase_item(1).await,
        Err(ClientError::SignInRequired)
    );
    assert_matches!(
        state.teams.create_team("Team", &[1]).await,
        Err(ClientError::SignInRequired)
    );
    assert_matches!(state.profile.load().await, Err(ClientError::SignInRequired));
    assert_eq!(
        ClientError::SignInRequired.user_message(),
        "Sign in to save your progress"
    );
}
