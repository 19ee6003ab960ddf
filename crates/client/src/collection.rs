//! The entity collection feature: stale-while-revalidate loading plus
//! catch and favorite actions.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use dexquest_core::entity::Pokemon;
use dexquest_core::types::DbId;
use dexquest_db::DataStore;
use dexquest_events::events::{CollectionEvent, FavoriteChanged};
use dexquest_events::{spawn_listener, EventBus};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::EntityCache;
use crate::error::ClientResult;
use crate::session::Session;

/// Loads the catalog into the shared cache and applies collection actions.
#[derive(Clone)]
pub struct CollectionService {
    store: Arc<dyn DataStore>,
    cache: Arc<EntityCache>,
    bus: Arc<EventBus>,
    session: Session,
    fetch_limit: i64,
    catching: Arc<Mutex<HashSet<DbId>>>,
}

impl CollectionService {
    pub fn new(
        store: Arc<dyn DataStore>,
        cache: Arc<EntityCache>,
        bus: Arc<EventBus>,
        session: Session,
        fetch_limit: i64,
    ) -> Self {
        Self {
            store,
            cache,
            bus,
            session,
            fetch_limit,
            catching: Arc::default(),
        }
    }

    /// Entities to render now.
    ///
    /// With cached data this returns immediately, starting a background
    /// refresh only when the cache has expired and none is running. With an
    /// empty cache it fetches and waits.
    pub async fn load(&self) -> ClientResult<Arc<Vec<Arc<Pokemon>>>> {
        if self.cache.has_data() {
            if !self.cache.is_cache_valid() && self.cache.set_loading(true) {
                let this = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = this.fetch_into_cache().await {
                        tracing::warn!(error = %e, "Background refresh failed, serving stale entities");
                    }
                });
            }
            return Ok(self.cache.entities());
        }

        self.refresh().await?;
        Ok(self.cache.entities())
    }

    /// Fetch the catalog and the user's flags and replace the cache.
    ///
    /// On failure the cache keeps its previous entities.
    pub async fn refresh(&self) -> ClientResult<()> {
        self.cache.set_loading(true);
        self.fetch_into_cache().await
    }

    async fn fetch_into_cache(&self) -> ClientResult<()> {
        let ticket = self.cache.begin_load();
        match self.fetch_catalog().await {
            Ok(entities) => {
                self.cache.complete_load(ticket, entities);
                Ok(())
            }
            Err(e) => {
                self.cache.abort_load(ticket);
                Err(e)
            }
        }
    }

    async fn fetch_catalog(&self) -> ClientResult<Vec<Pokemon>> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(self.store.fetch_all_pokemon(self.fetch_limit).await?);
        };

        let (entities, state) = tokio::try_join!(
            self.store.fetch_all_pokemon(self.fetch_limit),
            self.store.fetch_collection_state(user_id),
        )?;

        Ok(entities
            .into_iter()
            .map(|p| {
                let caught = state.caught_ids.contains(&p.id);
                let favorite = state.favorite_ids.contains(&p.id);
                Pokemon {
                    is_caught: caught,
                    is_favorite: favorite,
                    ..p
                }
            })
            .collect())
    }

    /// Re-read only the user's flags and apply them in one batch.
    pub async fn resync_states(&self) -> ClientResult<()> {
        let user_id = self.session.require_user()?;
        let state = self.store.fetch_collection_state(user_id).await?;
        self.cache
            .update_states(&state.caught_ids, &state.favorite_ids);
        Ok(())
    }

    /// Mark an entity caught.
    ///
    /// Returns false when it already was, or when a catch of the same entity
    /// is still in flight.
    pub async fn collect(&self, pokemon_id: DbId) -> ClientResult<bool> {
        let user_id = self.session.require_user()?;
        let Some(_guard) = self.begin_catch(pokemon_id) else {
            tracing::debug!(pokemon_id, "Catch already in flight");
            return Ok(false);
        };
        if self
            .cache
            .get_pokemon(pokemon_id)
            .is_some_and(|p| p.is_caught)
        {
            return Ok(false);
        }

        self.store.set_caught(user_id, pokemon_id, true).await?;
        self.cache.update_caught_state(pokemon_id, true);
        self.bus
            .publish_collected(CollectionEvent::Caught { pokemon_id });
        tracing::info!(user_id, pokemon_id, "Entity caught");
        Ok(true)
    }

    fn begin_catch(&self, pokemon_id: DbId) -> Option<CatchGuard> {
        let mut catching = self.catching.lock().unwrap_or_else(PoisonError::into_inner);
        catching.insert(pokemon_id).then(|| CatchGuard {
            catching: Arc::clone(&self.catching),
            pokemon_id,
        })
    }

    pub async fn release(&self, pokemon_id: DbId) -> ClientResult<()> {
        let user_id = self.session.require_user()?;
        self.store.set_caught(user_id, pokemon_id, false).await?;
        self.cache.update_caught_state(pokemon_id, false);
        self.bus
            .collection()
            .publish(CollectionEvent::Released { pokemon_id });
        Ok(())
    }

    pub async fn set_favorite(&self, pokemon_id: DbId, is_favorite: bool) -> ClientResult<()> {
        let user_id = self.session.require_user()?;
        self.store
            .set_favorite(user_id, pokemon_id, is_favorite)
            .await?;
        self.cache.update_favorite_state(pokemon_id, is_favorite);
        self.bus.publish_favorite(FavoriteChanged {
            pokemon_id,
            is_favorite,
        });
        Ok(())
    }

    /// React to full-refresh requests until `cancel` fires.
    pub fn spawn_listeners(&self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        let this = self.clone();
        let refresh = spawn_listener(self.bus.refresh().subscribe(), cancel.clone(), move |_| {
            let this = this.clone();
            async move {
                this.cache.invalidate();
                this.refresh().await?;
                Ok(())
            }
        });
        vec![refresh]
    }
}

/// Removes an entity from the in-flight catch set on every exit path.
struct CatchGuard {
    catching: Arc<Mutex<HashSet<DbId>>>,
    pokemon_id: DbId,
}

impl Drop for CatchGuard {
    fn drop(&mut self) {
        self.catching
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.pokemon_id);
    }
}
