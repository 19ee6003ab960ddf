#![allow(dead_code)]

use std::sync::Arc;

use dexquest_client::clock::{Clock, ManualClock};
use dexquest_client::config::ClientConfig;
use dexquest_client::session::Session;
use dexquest_client::state::AppState;
use dexquest_core::entity::Pokemon;
use dexquest_core::missions::{Mission, MissionRarity, CATEGORY_COLLECTION};
use dexquest_core::profile::{EquipCategory, Profile};
use dexquest_core::shop::ShopItem;
use dexquest_core::types::DbId;
use dexquest_db::MemoryStore;

pub const USER_ID: &str = "ash";

/// Catalog entry with the given id and a single type.
pub fn pokemon(id: DbId, type_tag: &str) -> Pokemon {
    Pokemon::new(id, format!("mon-{id}"), vec![type_tag.to_string()]).unwrap()
}

pub fn mission(id: DbId, requirement_value: i64, prerequisite: Option<DbId>) -> Mission {
    Mission {
        id,
        title: format!("Mission {id}"),
        description: String::new(),
        category: CATEGORY_COLLECTION.to_string(),
        rarity: MissionRarity::Common,
        requirement_value,
        gold_reward: 100,
        xp_reward: 50,
        prerequisite_mission_id: prerequisite,
        sort_order: id as i32,
    }
}

pub fn theme_item(id: DbId, name: &str, price: i64, color_spec: &str) -> ShopItem {
    ShopItem {
        id,
        name: name.to_string(),
        category: EquipCategory::Theme,
        price,
        color_spec: Some(color_spec.to_string()),
    }
}

/// Ten grass entities, a two-mission collection chain and one user with
/// `gold` gold.
pub fn seeded_store(gold: i64) -> MemoryStore {
    MemoryStore::new()
        .with_pokemon((1..=10).map(|id| pokemon(id, "grass")))
        .with_missions([mission(1, 5, None), mission(2, 8, Some(1))])
        .with_shop_items([theme_item(
            1,
            "Volcano Theme",
            300,
            r##"["#D00000","#FFBA08"]"##,
        )])
        .with_user(Profile {
            user_id: USER_ID.to_string(),
            display_name: "Ash".to_string(),
            gold,
            level: 1,
            ..Default::default()
        })
}

/// Application state over `store` with a manual clock.
pub fn build_state(store: Arc<MemoryStore>, session: Session) -> (AppState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let state = AppState::new(
        ClientConfig::default(),
        store,
        session,
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    (state, clock)
}
