use std::sync::Arc;

use dexquest_core::theme::ThemeCatalog;
use dexquest_db::DataStore;
use dexquest_events::EventBus;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::EntityCache;
use crate::clock::Clock;
use crate::collection::CollectionService;
use crate::config::ClientConfig;
use crate::missions::MissionService;
use crate::notifications::Notifier;
use crate::profile::ProfileService;
use crate::session::Session;
use crate::shop::ShopService;
use crate::teams::TeamService;

/// Composition root shared by every view.
///
/// The cache and the bus are the only process-wide mutable state; each
/// feature service receives references to them here. Cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub session: Session,
    /// Remote data store.
    pub store: Arc<dyn DataStore>,
    /// Shared entity cache.
    pub cache: Arc<EntityCache>,
    /// Cross-feature event bus.
    pub bus: Arc<EventBus>,
    pub collection: CollectionService,
    pub missions: MissionService,
    pub profile: ProfileService,
    pub shop: ShopService,
    pub teams: TeamService,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn DataStore>,
        session: Session,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(EntityCache::new(Arc::clone(&clock), config.cache_ttl));
        let bus = Arc::new(EventBus::new(config.event_channel_capacity));
        let notifier = Notifier::new(clock, config.notification_display);
        Self::assemble(Arc::new(config), store, session, cache, bus, notifier)
    }

    fn assemble(
        config: Arc<ClientConfig>,
        store: Arc<dyn DataStore>,
        session: Session,
        cache: Arc<EntityCache>,
        bus: Arc<EventBus>,
        notifier: Notifier,
    ) -> Self {
        let collection = CollectionService::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            Arc::clone(&bus),
            session.clone(),
            config.entity_fetch_limit,
        );
        let missions = MissionService::new(Arc::clone(&store), Arc::clone(&bus), session.clone());
        let profile = ProfileService::new(
            Arc::clone(&store),
            Arc::clone(&bus),
            session.clone(),
            Arc::new(ThemeCatalog::default()),
        );
        let shop = ShopService::new(Arc::clone(&store), Arc::clone(&bus), session.clone());
        let teams = TeamService::new(Arc::clone(&store), Arc::clone(&bus), session.clone());

        Self {
            config,
            session,
            store,
            cache,
            bus,
            collection,
            missions,
            profile,
            shop,
            teams,
            notifier,
        }
    }

    /// Start every feature's event listeners. They stop when `cancel` fires.
    pub fn spawn_listeners(&self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        let mut handles = self.collection.spawn_listeners(cancel);
        handles.extend(self.missions.spawn_listeners(cancel));
        handles.extend(self.profile.spawn_listeners(cancel));
        tracing::info!(listeners = handles.len(), "Event listeners started");
        handles
    }

    /// Switch to another user (or to guest).
    ///
    /// Clears the shared cache and replayed bus state, and returns services
    /// bound to the new session. Listeners spawned for the old state must be
    /// cancelled by the caller.
    pub fn switch_session(&self, session: Session) -> Self {
        self.cache.clear();
        self.bus.reset_session();
        tracing::info!(user_id = ?session.user_id(), "Session switched");
        Self::assemble(
            Arc::clone(&self.config),
            Arc::clone(&self.store),
            session,
            Arc::clone(&self.cache),
            Arc::clone(&self.bus),
            self.notifier.clone(),
        )
    }
}
