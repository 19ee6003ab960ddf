//! In-process [`DataStore`].
//!
//! All state sits behind one async mutex, so every operation (including
//! claims and purchases) is atomic with respect to every other. Used for
//! guest sessions, local demos, and tests; [`MemoryStore::set_offline`]
//! simulates transient network failure.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dexquest_core::entity::Pokemon;
use dexquest_core::missions::{
    plan_counter_sync, plan_root_initialization, CollectionSnapshot, Mission, MissionProgress,
    ProgressStatus, RewardGrant,
};
use dexquest_core::profile::{EquipCategory, Profile};
use dexquest_core::shop::{PurchaseReceipt, ShopItem, Team};
use dexquest_core::types::DbId;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::{equip_message, CollectionState, DataStore};

/// Per-user state.
#[derive(Debug, Default)]
struct UserRecord {
    profile: Profile,
    caught: BTreeSet<DbId>,
    favorites: BTreeSet<DbId>,
    progress: BTreeMap<DbId, MissionProgress>,
    inventory: BTreeSet<DbId>,
    teams: Vec<Team>,
}

#[derive(Debug, Default)]
struct MemoryState {
    pokemon: BTreeMap<DbId, Pokemon>,
    missions: Vec<Mission>,
    shop: BTreeMap<DbId, ShopItem>,
    users: HashMap<String, UserRecord>,
    next_team_id: DbId,
}

impl MemoryState {
    fn user(&self, user_id: &str) -> Result<&UserRecord, StoreError> {
        self.users
            .get(user_id)
            .ok_or_else(|| StoreError::not_found("profile", user_id))
    }

    fn user_mut(&mut self, user_id: &str) -> Result<&mut UserRecord, StoreError> {
        self.users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::not_found("profile", user_id))
    }

    fn progress_rows(&self, user_id: &str) -> Result<Vec<MissionProgress>, StoreError> {
        Ok(self.user(user_id)?.progress.values().cloned().collect())
    }

    fn snapshot(&self, user_id: &str) -> Result<CollectionSnapshot, StoreError> {
        let user = self.user(user_id)?;
        Ok(CollectionSnapshot {
            caught: user
                .caught
                .iter()
                .filter_map(|id| self.pokemon.get(id).cloned())
                .collect(),
            favorite_count: user.favorites.len() as i64,
            team_count: user.teams.len() as i64,
            purchase_count: user.inventory.len() as i64,
        })
    }
}

/// [`DataStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Seeding ------------------------------------------------------------

    pub fn with_pokemon(mut self, pokemon: impl IntoIterator<Item = Pokemon>) -> Self {
        let state = self.state.get_mut();
        for p in pokemon {
            state.pokemon.insert(p.id, p);
        }
        self
    }

    /// Seed the catalog; it is kept ordered by `sort_order`, then id.
    pub fn with_missions(mut self, missions: impl IntoIterator<Item = Mission>) -> Self {
        let state = self.state.get_mut();
        state.missions.extend(missions);
        state.missions.sort_by_key(|m| (m.sort_order, m.id));
        self
    }

    pub fn with_shop_items(mut self, items: impl IntoIterator<Item = ShopItem>) -> Self {
        let state = self.state.get_mut();
        for item in items {
            state.shop.insert(item.id, item);
        }
        self
    }

    pub fn with_user(mut self, profile: Profile) -> Self {
        let record = UserRecord {
            profile: profile.clone(),
            ..Default::default()
        };
        self.state
            .get_mut()
            .users
            .insert(profile.user_id.clone(), record);
        self
    }

    /// Overwrite a user's progress row directly.
    pub async fn put_progress(&self, user_id: &str, row: MissionProgress) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.user_mut(user_id)?.progress.insert(row.mission_id, row);
        Ok(())
    }

    // -- Failure simulation --------------------------------------------------

    /// While offline, every operation fails with [`StoreError::Network`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Network("store unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn fetch_all_pokemon(&self, limit: i64) -> Result<Vec<Pokemon>, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(state.pokemon.values().take(limit).cloned().collect())
    }

    async fn fetch_collection_state(&self, user_id: &str) -> Result<CollectionState, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        let user = state.user(user_id)?;
        Ok(CollectionState {
            caught_ids: user.caught.iter().copied().collect(),
            favorite_ids: user.favorites.iter().copied().collect(),
        })
    }

    async fn set_caught(
        &self,
        user_id: &str,
        pokemon_id: DbId,
        caught: bool,
    ) -> Result<(), StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        if !state.pokemon.contains_key(&pokemon_id) {
            return Err(StoreError::not_found("pokemon", pokemon_id));
        }
        let user = state.user_mut(user_id)?;
        if caught {
            user.caught.insert(pokemon_id);
        } else {
            user.caught.remove(&pokemon_id);
        }
        Ok(())
    }

    async fn set_favorite(
        &self,
        user_id: &str,
        pokemon_id: DbId,
        favorite: bool,
    ) -> Result<(), StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        if !state.pokemon.contains_key(&pokemon_id) {
            return Err(StoreError::not_found("pokemon", pokemon_id));
        }
        let user = state.user_mut(user_id)?;
        if favorite {
            user.favorites.insert(pokemon_id);
        } else {
            user.favorites.remove(&pokemon_id);
        }
        Ok(())
    }

    async fn fetch_missions_catalog(&self) -> Result<Vec<Mission>, StoreError> {
        self.check_online()?;
        Ok(self.state.lock().await.missions.clone())
    }

    async fn fetch_user_mission_progress(
        &self,
        user_id: &str,
    ) -> Result<Vec<MissionProgress>, StoreError> {
        self.check_online()?;
        self.state.lock().await.progress_rows(user_id)
    }

    async fn ensure_root_missions_initialized(&self, user_id: &str) -> Result<(), StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let rows = plan_root_initialization(&state.missions, &state.progress_rows(user_id)?);
        let user = state.user_mut(user_id)?;
        for row in rows {
            user.progress.entry(row.mission_id).or_insert(row);
        }
        Ok(())
    }

    async fn sync_mission_counters(&self, user_id: &str) -> Result<(), StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let rows = plan_counter_sync(
            &state.missions,
            &state.progress_rows(user_id)?,
            &state.snapshot(user_id)?,
        );
        let user = state.user_mut(user_id)?;
        for row in rows {
            user.progress.insert(row.mission_id, row);
        }
        Ok(())
    }

    async fn atomic_claim(
        &self,
        user_id: &str,
        mission_id: DbId,
    ) -> Result<RewardGrant, StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let mission = state
            .missions
            .iter()
            .find(|m| m.id == mission_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("mission", mission_id))?;

        let user = state.user_mut(user_id)?;
        let row = user
            .progress
            .get_mut(&mission_id)
            .ok_or(StoreError::NotEligible(mission_id))?;

        match row.status {
            ProgressStatus::Completed => return Err(StoreError::AlreadyClaimed(mission_id)),
            ProgressStatus::Active if row.current_value < mission.requirement_value => {
                return Err(StoreError::NotEligible(mission_id));
            }
            ProgressStatus::Active => row.status = ProgressStatus::Completed,
        }

        let grant = mission.reward();
        user.profile = user
            .profile
            .with_gold_delta(grant.gold_reward)
            .with_xp_gained(grant.xp_reward);
        Ok(grant)
    }

    async fn fetch_user_profile(&self, user_id: &str) -> Result<Profile, StoreError> {
        self.check_online()?;
        Ok(self.state.lock().await.user(user_id)?.profile.clone())
    }

    async fn list_shop_items(&self) -> Result<Vec<ShopItem>, StoreError> {
        self.check_online()?;
        Ok(self.state.lock().await.shop.values().cloned().collect())
    }

    async fn purchase_item(
        &self,
        user_id: &str,
        item_id: DbId,
    ) -> Result<PurchaseReceipt, StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let item = state
            .shop
            .get(&item_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("shop item", item_id))?;

        let user = state.user_mut(user_id)?;
        if user.inventory.contains(&item_id) {
            return Err(StoreError::AlreadyOwned(item_id));
        }
        if user.profile.gold < item.price {
            return Err(StoreError::InsufficientGold {
                required: item.price,
                available: user.profile.gold,
            });
        }

        user.profile = user.profile.with_gold_delta(-item.price);
        user.inventory.insert(item_id);
        Ok(PurchaseReceipt {
            item,
            remaining_gold: user.profile.gold,
        })
    }

    async fn update_equipped_item(
        &self,
        user_id: &str,
        category: EquipCategory,
        item_name: &str,
    ) -> Result<String, StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let owned = state.user(user_id)?.inventory.clone();
        let item = state
            .shop
            .values()
            .find(|i| i.category == category && i.name == item_name && owned.contains(&i.id))
            .cloned()
            .ok_or_else(|| StoreError::NotOwned(item_name.to_string()))?;

        let profile = &mut state.user_mut(user_id)?.profile;
        match category {
            EquipCategory::Theme => {
                profile.theme_colors = Some(item.color_spec.clone().unwrap_or(item.name.clone()));
            }
            EquipCategory::AvatarFrame => profile.equipped_avatar_frame = Some(item.name.clone()),
            EquipCategory::Title => profile.equipped_title = Some(item.name.clone()),
        }
        Ok(equip_message(category, &item.name))
    }

    async fn create_team(
        &self,
        user_id: &str,
        name: &str,
        member_ids: &[DbId],
    ) -> Result<Team, StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        state.user(user_id)?;
        state.next_team_id += 1;
        let team = Team {
            id: state.next_team_id,
            name: name.to_string(),
            member_ids: member_ids.to_vec(),
        };
        state.user_mut(user_id)?.teams.push(team.clone());
        Ok(team)
    }

    async fn delete_team(&self, user_id: &str, team_id: DbId) -> Result<(), StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let teams = &mut state.user_mut(user_id)?.teams;
        let before = teams.len();
        teams.retain(|t| t.id != team_id);
        if teams.len() == before {
            return Err(StoreError::not_found("team", team_id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
