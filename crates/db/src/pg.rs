//! PostgreSQL-backed [`DataStore`].

use async_trait::async_trait;
use dexquest_core::entity::Pokemon;
use dexquest_core::missions::{
    plan_counter_sync, plan_root_initialization, CollectionSnapshot, Mission, MissionProgress,
    RewardGrant,
};
use dexquest_core::profile::{EquipCategory, Profile};
use dexquest_core::shop::{PurchaseReceipt, ShopItem, Team};
use dexquest_core::types::DbId;

use crate::error::StoreError;
use crate::repositories::{
    ClaimOutcome, MissionRepo, PokemonRepo, ProfileRepo, PurchaseOutcome, ShopRepo, TeamRepo,
};
use crate::store::{equip_message, CollectionState, DataStore};
use crate::DbPool;

/// [`DataStore`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn collection_snapshot(&self, user_id: &str) -> Result<CollectionSnapshot, StoreError> {
        let caught = PokemonRepo::list_caught(&self.pool, user_id)
            .await?
            .into_iter()
            .map(Pokemon::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CollectionSnapshot {
            caught,
            favorite_count: PokemonRepo::count_favorites(&self.pool, user_id).await?,
            team_count: TeamRepo::count(&self.pool, user_id).await?,
            purchase_count: ShopRepo::count_purchases(&self.pool, user_id).await?,
        })
    }
}

#[async_trait]
impl DataStore for PgStore {
    async fn fetch_all_pokemon(&self, limit: i64) -> Result<Vec<Pokemon>, StoreError> {
        PokemonRepo::list(&self.pool, limit)
            .await?
            .into_iter()
            .map(Pokemon::try_from)
            .collect()
    }

    async fn fetch_collection_state(&self, user_id: &str) -> Result<CollectionState, StoreError> {
        let rows = PokemonRepo::list_user_flags(&self.pool, user_id).await?;
        let mut state = CollectionState::default();
        for row in rows {
            if row.is_caught {
                state.caught_ids.insert(row.pokemon_id);
            }
            if row.is_favorite {
                state.favorite_ids.insert(row.pokemon_id);
            }
        }
        Ok(state)
    }

    async fn set_caught(
        &self,
        user_id: &str,
        pokemon_id: DbId,
        caught: bool,
    ) -> Result<(), StoreError> {
        if !PokemonRepo::set_caught(&self.pool, user_id, pokemon_id, caught).await? {
            return Err(StoreError::not_found("pokemon", pokemon_id));
        }
        Ok(())
    }

    async fn set_favorite(
        &self,
        user_id: &str,
        pokemon_id: DbId,
        favorite: bool,
    ) -> Result<(), StoreError> {
        if !PokemonRepo::set_favorite(&self.pool, user_id, pokemon_id, favorite).await? {
            return Err(StoreError::not_found("pokemon", pokemon_id));
        }
        Ok(())
    }

    async fn fetch_missions_catalog(&self) -> Result<Vec<Mission>, StoreError> {
        MissionRepo::list_catalog(&self.pool)
            .await?
            .into_iter()
            .map(Mission::try_from)
            .collect()
    }

    async fn fetch_user_mission_progress(
        &self,
        user_id: &str,
    ) -> Result<Vec<MissionProgress>, StoreError> {
        MissionRepo::list_progress(&self.pool, user_id)
            .await?
            .into_iter()
            .map(MissionProgress::try_from)
            .collect()
    }

    async fn ensure_root_missions_initialized(&self, user_id: &str) -> Result<(), StoreError> {
        let missions = self.fetch_missions_catalog().await?;
        let progress = self.fetch_user_mission_progress(user_id).await?;
        let rows = plan_root_initialization(&missions, &progress);
        let inserted = MissionRepo::insert_missing(&self.pool, user_id, &rows).await?;
        if inserted > 0 {
            tracing::info!(user_id, inserted, "Initialized root missions");
        }
        Ok(())
    }

    async fn sync_mission_counters(&self, user_id: &str) -> Result<(), StoreError> {
        let missions = self.fetch_missions_catalog().await?;
        let progress = self.fetch_user_mission_progress(user_id).await?;
        let snapshot = self.collection_snapshot(user_id).await?;

        let rows = plan_counter_sync(&missions, &progress, &snapshot);
        let written = MissionRepo::raise_counters(&self.pool, user_id, &rows).await?;
        tracing::debug!(user_id, planned = rows.len(), written, "Synced mission counters");
        Ok(())
    }

    async fn atomic_claim(
        &self,
        user_id: &str,
        mission_id: DbId,
    ) -> Result<RewardGrant, StoreError> {
        match MissionRepo::claim(&self.pool, user_id, mission_id).await? {
            ClaimOutcome::Granted(grant) => Ok(grant),
            ClaimOutcome::AlreadyClaimed => Err(StoreError::AlreadyClaimed(mission_id)),
            ClaimOutcome::NotEligible => Err(StoreError::NotEligible(mission_id)),
        }
    }

    async fn fetch_user_profile(&self, user_id: &str) -> Result<Profile, StoreError> {
        ProfileRepo::find(&self.pool, user_id)
            .await?
            .map(Profile::from)
            .ok_or_else(|| StoreError::not_found("profile", user_id))
    }

    async fn list_shop_items(&self) -> Result<Vec<ShopItem>, StoreError> {
        ShopRepo::list(&self.pool)
            .await?
            .into_iter()
            .map(ShopItem::try_from)
            .collect()
    }

    async fn purchase_item(
        &self,
        user_id: &str,
        item_id: DbId,
    ) -> Result<PurchaseReceipt, StoreError> {
        let item: ShopItem = ShopRepo::find(&self.pool, item_id)
            .await?
            .ok_or_else(|| StoreError::not_found("shop item", item_id))?
            .try_into()?;

        match ShopRepo::purchase(&self.pool, user_id, item.id, item.price).await? {
            PurchaseOutcome::Purchased { remaining_gold } => Ok(PurchaseReceipt {
                item,
                remaining_gold,
            }),
            PurchaseOutcome::AlreadyOwned => Err(StoreError::AlreadyOwned(item_id)),
            PurchaseOutcome::InsufficientGold { available } => Err(StoreError::InsufficientGold {
                required: item.price,
                available,
            }),
        }
    }

    async fn update_equipped_item(
        &self,
        user_id: &str,
        category: EquipCategory,
        item_name: &str,
    ) -> Result<String, StoreError> {
        let item: ShopItem =
            ShopRepo::find_owned_by_name(&self.pool, user_id, category.as_str(), item_name)
                .await?
                .ok_or_else(|| StoreError::NotOwned(item_name.to_string()))?
                .try_into()?;

        let (column, value) = match category {
            EquipCategory::Theme => (
                "theme_colors",
                item.color_spec.clone().unwrap_or_else(|| item.name.clone()),
            ),
            EquipCategory::AvatarFrame => ("equipped_avatar_frame", item.name.clone()),
            EquipCategory::Title => ("equipped_title", item.name.clone()),
        };

        if !ProfileRepo::set_equipped(&self.pool, user_id, column, &value).await? {
            return Err(StoreError::not_found("profile", user_id));
        }
        Ok(equip_message(category, &item.name))
    }

    async fn create_team(
        &self,
        user_id: &str,
        name: &str,
        member_ids: &[DbId],
    ) -> Result<Team, StoreError> {
        Ok(TeamRepo::create(&self.pool, user_id, name, member_ids)
            .await?
            .into())
    }

    async fn delete_team(&self, user_id: &str, team_id: DbId) -> Result<(), StoreError> {
        if !TeamRepo::delete(&self.pool, user_id, team_id).await? {
            return Err(StoreError::not_found("team", team_id));
        }
        Ok(())
    }
}
