//! Seed data for running the client without a database.

use dexquest_core::entity::Pokemon;
use dexquest_core::missions::{Mission, MissionRarity, CATEGORY_COLLECTION, CATEGORY_SHOP};
use dexquest_core::profile::{EquipCategory, Profile};
use dexquest_core::shop::ShopItem;
use dexquest_core::types::DbId;
use dexquest_db::MemoryStore;

pub const DEMO_USER_ID: &str = "demo-trainer";

const STARTERS: &[(DbId, &str, &[&str])] = &[
    (1, "Bulbasaur", &["grass", "poison"]),
    (2, "Ivysaur", &["grass", "poison"]),
    (3, "Venusaur", &["grass", "poison"]),
    (4, "Charmander", &["fire"]),
    (5, "Charmeleon", &["fire"]),
    (6, "Charizard", &["fire", "flying"]),
    (7, "Squirtle", &["water"]),
    (8, "Wartortle", &["water"]),
    (9, "Blastoise", &["water"]),
    (152, "Chikorita", &["grass"]),
];

fn mission(
    id: DbId,
    title: &str,
    category: &str,
    requirement_value: i64,
    gold_reward: i64,
    prerequisite_mission_id: Option<DbId>,
) -> Mission {
    Mission {
        id,
        title: title.to_string(),
        description: format!("{title}: reach {requirement_value}"),
        category: category.to_string(),
        rarity: if prerequisite_mission_id.is_some() {
            MissionRarity::Rare
        } else {
            MissionRarity::Common
        },
        requirement_value,
        gold_reward,
        xp_reward: gold_reward * 2,
        prerequisite_mission_id,
        sort_order: id as i32,
    }
}

/// An in-memory store with a small catalog, a mission chain, three shop
/// items and one user holding 500 gold.
pub fn demo_store() -> MemoryStore {
    MemoryStore::new()
        .with_pokemon(STARTERS.iter().map(|(id, name, types)| Pokemon {
            id: *id,
            name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            is_caught: false,
            is_favorite: false,
        }))
        .with_missions([
            mission(1, "First Catch", CATEGORY_COLLECTION, 1, 100, None),
            mission(2, "Budding Collector", CATEGORY_COLLECTION, 5, 250, Some(1)),
            mission(3, "Green Thumb", "type:grass", 2, 150, None),
            mission(4, "Johto Scout", "generation:2", 1, 200, Some(3)),
            mission(5, "Window Shopper", CATEGORY_SHOP, 1, 50, None),
        ])
        .with_shop_items([
            ShopItem {
                id: 1,
                name: "Ocean Breeze".into(),
                category: EquipCategory::Theme,
                price: 300,
                color_spec: Some(r##"["#0077B6","#90E0EF"]"##.into()),
            },
            ShopItem {
                id: 2,
                name: "Golden Frame".into(),
                category: EquipCategory::AvatarFrame,
                price: 500,
                color_spec: None,
            },
            ShopItem {
                id: 3,
                name: "Rookie".into(),
                category: EquipCategory::Title,
                price: 0,
                color_spec: None,
            },
        ])
        .with_user(Profile {
            user_id: DEMO_USER_ID.into(),
            display_name: "Demo Trainer".into(),
            gold: 500,
            xp: 0,
            level: 1,
            ..Default::default()
        })
}
