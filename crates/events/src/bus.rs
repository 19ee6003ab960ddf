//! The application-wide event bus.
//!
//! [`EventBus`] groups one independent [`Topic`] per event kind so each
//! consumer subscribes only to what it cares about. It is constructed once
//! by the composition root and shared as `Arc<EventBus>`.
//!
//! The `publish_*` helpers encode the cross-topic effects of each domain
//! action. All events of one action are enqueued before the helper returns;
//! subscribers of different topics may still observe them in any order.

use crate::events::{
    CollectionEvent, FavoriteChanged, GoldChanged, InventoryEquipChanged, MissionClaimed,
    MissionProgressChanged, ProfileUpdated, ProgressTrigger, PurchaseMade, RefreshRequested,
    TeamEvent,
};
use crate::topic::{ReplayTopic, Topic};

/// Default per-topic buffer capacity.
pub const DEFAULT_CAPACITY: usize = 256;

/// Multi-topic publish/subscribe hub.
///
/// # Usage
///
/// ```rust
/// use dexquest_events::EventBus;
/// use dexquest_events::events::GoldChanged;
///
/// let bus = EventBus::default();
/// let mut rx = bus.gold().subscribe();
///
/// bus.gold().publish(GoldChanged { delta: -300 });
/// assert_eq!(rx.try_recv(), Some(GoldChanged { delta: -300 }));
/// ```
pub struct EventBus {
    collection: Topic<CollectionEvent>,
    favorites: Topic<FavoriteChanged>,
    mission_progress: Topic<MissionProgressChanged>,
    mission_claimed: Topic<MissionClaimed>,
    purchases: Topic<PurchaseMade>,
    gold: Topic<GoldChanged>,
    teams: Topic<TeamEvent>,
    profile: Topic<ProfileUpdated>,
    inventory: ReplayTopic<InventoryEquipChanged>,
    refresh: Topic<RefreshRequested>,
}

impl EventBus {
    /// Create a bus whose topics each buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            collection: Topic::new("collection", capacity),
            favorites: Topic::new("favorites", capacity),
            mission_progress: Topic::new("mission_progress", capacity),
            mission_claimed: Topic::new("mission_claimed", capacity),
            purchases: Topic::new("purchases", capacity),
            gold: Topic::new("gold", capacity),
            teams: Topic::new("teams", capacity),
            profile: Topic::new("profile", capacity),
            inventory: ReplayTopic::new("inventory", capacity),
            refresh: Topic::new("refresh", capacity),
        }
    }

    // -- Topic accessors ----------------------------------------------------

    pub fn collection(&self) -> &Topic<CollectionEvent> {
        &self.collection
    }

    pub fn favorites(&self) -> &Topic<FavoriteChanged> {
        &self.favorites
    }

    pub fn mission_progress(&self) -> &Topic<MissionProgressChanged> {
        &self.mission_progress
    }

    pub fn mission_claimed(&self) -> &Topic<MissionClaimed> {
        &self.mission_claimed
    }

    pub fn purchases(&self) -> &Topic<PurchaseMade> {
        &self.purchases
    }

    pub fn gold(&self) -> &Topic<GoldChanged> {
        &self.gold
    }

    pub fn teams(&self) -> &Topic<TeamEvent> {
        &self.teams
    }

    pub fn profile(&self) -> &Topic<ProfileUpdated> {
        &self.profile
    }

    /// The equipped-inventory topic; late subscribers receive the latest
    /// event immediately.
    pub fn inventory(&self) -> &ReplayTopic<InventoryEquipChanged> {
        &self.inventory
    }

    pub fn refresh(&self) -> &Topic<RefreshRequested> {
        &self.refresh
    }

    // -- Domain actions -----------------------------------------------------

    /// A new entity was caught: collection + mission progress.
    pub fn publish_collected(&self, event: CollectionEvent) {
        self.collection.publish(event);
        self.progress_changed(ProgressTrigger::Collection);
    }

    /// Favorite toggled: favorites + mission progress.
    pub fn publish_favorite(&self, event: FavoriteChanged) {
        self.favorites.publish(event);
        self.progress_changed(ProgressTrigger::Favorite);
    }

    /// Team created or removed: teams + mission progress.
    pub fn publish_team(&self, event: TeamEvent) {
        self.teams.publish(event);
        self.progress_changed(ProgressTrigger::Team);
    }

    /// Shop purchase redeemed: purchase, mission progress, then gold spent
    /// when the item was not free.
    pub fn publish_purchase(&self, event: PurchaseMade, price: i64) {
        self.purchases.publish(event);
        self.progress_changed(ProgressTrigger::Purchase);
        if price > 0 {
            self.gold.publish(GoldChanged { delta: -price });
        }
    }

    /// Mission reward claimed. Gold is credited separately by the caller.
    pub fn publish_claimed(&self, event: MissionClaimed) {
        self.mission_claimed.publish(event);
    }

    /// Ask every view to drop cached state and reload.
    pub fn request_refresh(&self) {
        self.refresh.publish(RefreshRequested);
    }

    /// Forget replayable state when the signed-in user changes.
    pub fn reset_session(&self) {
        self.inventory.reset();
    }

    fn progress_changed(&self, trigger: ProgressTrigger) {
        self.mission_progress
            .publish(MissionProgressChanged { trigger });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use dexquest_core::profile::EquipCategory;

    use super::*;

    #[test]
    fn collecting_emits_collection_and_progress() {
        let bus = EventBus::default();
        let mut collection = bus.collection().subscribe();
        let mut progress = bus.mission_progress().subscribe();

        bus.publish_collected(CollectionEvent::Caught { pokemon_id: 25 });

        assert_eq!(
            collection.try_recv(),
            Some(CollectionEvent::Caught { pokemon_id: 25 })
        );
        assert_eq!(
            progress.try_recv(),
            Some(MissionProgressChanged {
                trigger: ProgressTrigger::Collection
            })
        );
    }

    #[test]
    fn favoriting_emits_favorite_and_progress() {
        let bus = EventBus::default();
        let mut favorites = bus.favorites().subscribe();
        let mut progress = bus.mission_progress().subscribe();

        bus.publish_favorite(FavoriteChanged {
            pokemon_id: 1,
            is_favorite: true,
        });

        assert!(favorites.try_recv().is_some());
        assert_eq!(
            progress.try_recv().map(|e| e.trigger),
            Some(ProgressTrigger::Favorite)
        );
    }

    #[test]
    fn team_creation_emits_team_and_progress() {
        let bus = EventBus::default();
        let mut teams = bus.teams().subscribe();
        let mut progress = bus.mission_progress().subscribe();

        bus.publish_team(TeamEvent::Created { team_id: 3 });

        assert_eq!(teams.try_recv(), Some(TeamEvent::Created { team_id: 3 }));
        assert_eq!(
            progress.try_recv().map(|e| e.trigger),
            Some(ProgressTrigger::Team)
        );
    }

    #[test]
    fn paid_purchase_emits_gold_spent() {
        let bus = EventBus::default();
        let mut purchases = bus.purchases().subscribe();
        let mut progress = bus.mission_progress().subscribe();
        let mut gold = bus.gold().subscribe();

        bus.publish_purchase(
            PurchaseMade {
                item_id: 9,
                category: EquipCategory::Theme,
            },
            300,
        );

        assert!(purchases.try_recv().is_some());
        assert!(progress.try_recv().is_some());
        assert_eq!(gold.try_recv(), Some(GoldChanged { delta: -300 }));
    }

    #[test]
    fn free_purchase_skips_gold() {
        let bus = EventBus::default();
        let mut gold = bus.gold().subscribe();

        bus.publish_purchase(
            PurchaseMade {
                item_id: 9,
                category: EquipCategory::Title,
            },
            0,
        );

        assert_eq!(gold.try_recv(), None);
    }

    #[test]
    fn claim_emits_only_claimed() {
        let bus = EventBus::default();
        let mut claimed = bus.mission_claimed().subscribe();
        let mut gold = bus.gold().subscribe();
        let mut progress = bus.mission_progress().subscribe();

        bus.publish_claimed(MissionClaimed {
            mission_id: 4,
            gold_reward: 100,
            xp_reward: 20,
        });

        assert!(claimed.try_recv().is_some());
        assert_eq!(gold.try_recv(), None);
        assert_eq!(progress.try_recv(), None);
    }

    #[test]
    fn only_inventory_topic_replays() {
        let bus = EventBus::default();
        bus.inventory().publish(InventoryEquipChanged {
            category: EquipCategory::Theme,
            item_name: "Volcano".into(),
        });
        bus.gold().publish(GoldChanged { delta: 5 });

        let mut inventory = bus.inventory().subscribe();
        let mut gold = bus.gold().subscribe();

        assert_eq!(
            inventory.try_recv().map(|e| e.item_name),
            Some("Volcano".to_string())
        );
        assert_eq!(inventory.try_recv(), None);
        assert_eq!(gold.try_recv(), None);
    }

    #[test]
    fn reset_session_drops_inventory_replay() {
        let bus = EventBus::default();
        bus.inventory().publish(InventoryEquipChanged {
            category: EquipCategory::Title,
            item_name: "Champion".into(),
        });
        bus.reset_session();
        assert_eq!(bus.inventory().subscribe().try_recv(), None);
    }
}
