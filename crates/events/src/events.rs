//! Event values published on the bus, one type per topic.

use dexquest_core::profile::EquipCategory;
use dexquest_core::types::DbId;
use serde::Serialize;

/// A change to which entities the user has caught.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectionEvent {
    Caught { pokemon_id: DbId },
    Released { pokemon_id: DbId },
}

/// An entity was favorited or unfavorited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteChanged {
    pub pokemon_id: DbId,
    pub is_favorite: bool,
}

/// What caused mission counters to possibly move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTrigger {
    Collection,
    Favorite,
    Team,
    Purchase,
}

/// Mission counters may have changed; mission views should reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissionProgressChanged {
    pub trigger: ProgressTrigger,
}

/// A mission reward was claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissionClaimed {
    pub mission_id: DbId,
    pub gold_reward: i64,
    pub xp_reward: i64,
}

/// A shop item was bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseMade {
    pub item_id: DbId,
    pub category: EquipCategory,
}

/// The user's gold balance moved by `delta` (negative when spent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoldChanged {
    pub delta: i64,
}

/// A team was created or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TeamEvent {
    Created { team_id: DbId },
    Deleted { team_id: DbId },
}

/// The stored profile changed and should be re-read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdated {
    pub user_id: String,
}

/// The item equipped in a slot changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEquipChanged {
    pub category: EquipCategory,
    pub item_name: String,
}

/// Every view should discard cached state and reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshRequested;
