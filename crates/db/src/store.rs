//! The data-store seam the client services are written against.

use std::collections::HashSet;

use async_trait::async_trait;
use dexquest_core::entity::Pokemon;
use dexquest_core::missions::{Mission, MissionProgress, RewardGrant};
use dexquest_core::profile::{EquipCategory, Profile};
use dexquest_core::shop::{PurchaseReceipt, ShopItem, Team};
use dexquest_core::types::DbId;

use crate::error::StoreError;

/// A user's caught and favorite entity ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionState {
    pub caught_ids: HashSet<DbId>,
    pub favorite_ids: HashSet<DbId>,
}

/// Remote relational store.
///
/// Every user-scoped method takes the signed-in user's id; obtaining it is
/// the caller's concern. `atomic_claim` and `purchase_item` must be atomic
/// on the store side: they are the only guard against double grants.
#[async_trait]
pub trait DataStore: Send + Sync {
    // -- Entities -----------------------------------------------------------

    /// Bulk read of the entity catalog, flags cleared, ordered by id.
    async fn fetch_all_pokemon(&self, limit: i64) -> Result<Vec<Pokemon>, StoreError>;

    async fn fetch_collection_state(&self, user_id: &str) -> Result<CollectionState, StoreError>;

    async fn set_caught(&self, user_id: &str, pokemon_id: DbId, caught: bool)
        -> Result<(), StoreError>;

    async fn set_favorite(
        &self,
        user_id: &str,
        pokemon_id: DbId,
        favorite: bool,
    ) -> Result<(), StoreError>;

    // -- Missions -----------------------------------------------------------

    /// Mission catalog ordered by `sort_order`, then id.
    async fn fetch_missions_catalog(&self) -> Result<Vec<Mission>, StoreError>;

    async fn fetch_user_mission_progress(
        &self,
        user_id: &str,
    ) -> Result<Vec<MissionProgress>, StoreError>;

    /// Give every root mission an active progress row.
    async fn ensure_root_missions_initialized(&self, user_id: &str) -> Result<(), StoreError>;

    /// Recompute counter-driven mission progress from real counts.
    async fn sync_mission_counters(&self, user_id: &str) -> Result<(), StoreError>;

    /// Flip an eligible mission from active to completed and credit its
    /// reward, in one atomic step.
    async fn atomic_claim(&self, user_id: &str, mission_id: DbId)
        -> Result<RewardGrant, StoreError>;

    // -- Profile & shop -----------------------------------------------------

    async fn fetch_user_profile(&self, user_id: &str) -> Result<Profile, StoreError>;

    async fn list_shop_items(&self) -> Result<Vec<ShopItem>, StoreError>;

    /// Debit the item's price and add it to the user's inventory atomically.
    async fn purchase_item(&self, user_id: &str, item_id: DbId)
        -> Result<PurchaseReceipt, StoreError>;

    /// Equip an owned item and return a confirmation message.
    async fn update_equipped_item(
        &self,
        user_id: &str,
        category: EquipCategory,
        item_name: &str,
    ) -> Result<String, StoreError>;

    // -- Teams --------------------------------------------------------------

    async fn create_team(
        &self,
        user_id: &str,
        name: &str,
        member_ids: &[DbId],
    ) -> Result<Team, StoreError>;

    async fn delete_team(&self, user_id: &str, team_id: DbId) -> Result<(), StoreError>;
}

/// Confirmation shown after equipping an item.
pub fn equip_message(category: EquipCategory, item_name: &str) -> String {
    format!("Equipped {item_name} as your {}", category.label())
}
