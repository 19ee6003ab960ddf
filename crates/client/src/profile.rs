//! Profile state and theme reconciliation.
//!
//! The profile is kept locally as a watch value. The store owns the balance,
//! so every event that can change it (gold, claims, equips) triggers a
//! reload rather than a local adjustment. Reloads are stamped like mission
//! loads: a fetch that started before the displayed one is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dexquest_core::profile::{EquipCategory, Profile};
use dexquest_core::theme::ThemeCatalog;
use dexquest_db::DataStore;
use dexquest_events::events::ProfileUpdated;
use dexquest_events::{spawn_listener, EventBus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ClientResult;
use crate::session::Session;

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn DataStore>,
    bus: Arc<EventBus>,
    session: Session,
    themes: Arc<ThemeCatalog>,
    profile: Arc<watch::Sender<Option<Profile>>>,
    colors: Arc<watch::Sender<Vec<String>>>,
    last_seq: Arc<AtomicU64>,
    shown_seq: Arc<AtomicU64>,
}

impl ProfileService {
    pub fn new(
        store: Arc<dyn DataStore>,
        bus: Arc<EventBus>,
        session: Session,
        themes: Arc<ThemeCatalog>,
    ) -> Self {
        let (profile, _) = watch::channel(None);
        let (colors, _) = watch::channel(themes.display_colors(None));
        Self {
            store,
            bus,
            session,
            themes,
            profile: Arc::new(profile),
            colors: Arc::new(colors),
            last_seq: Arc::new(AtomicU64::new(0)),
            shown_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The last loaded profile; `None` for guests and before the first load.
    pub fn profile(&self) -> Option<Profile> {
        self.profile.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Profile>> {
        self.profile.subscribe()
    }

    /// Current gradient colors, always at least two.
    pub fn display_colors(&self) -> Vec<String> {
        self.colors.borrow().clone()
    }

    pub fn subscribe_colors(&self) -> watch::Receiver<Vec<String>> {
        self.colors.subscribe()
    }

    /// Fetch the profile, recompute the theme and announce the update.
    ///
    /// Returns the fetched profile even when a newer load is already on
    /// display; only the display is guarded.
    pub async fn load(&self) -> ClientResult<Profile> {
        let user_id = self.session.require_user()?;
        let seq = self.last_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let profile = self.store.fetch_user_profile(user_id).await?;

        if self.publish_profile(seq, &profile) {
            tracing::debug!(user_id, seq, gold = profile.gold, level = profile.level, "Profile loaded");
        } else {
            tracing::debug!(user_id, seq, "Discarded stale profile");
        }
        self.bus.profile().publish(ProfileUpdated {
            user_id: user_id.to_string(),
        });
        Ok(profile)
    }

    fn publish_profile(&self, seq: u64, profile: &Profile) -> bool {
        // Stamp, profile and palette all change under the profile watch lock.
        self.profile.send_if_modified(|current| {
            if seq <= self.shown_seq.load(Ordering::SeqCst) {
                return false;
            }
            self.shown_seq.store(seq, Ordering::SeqCst);
            self.apply_theme(profile);
            *current = Some(profile.clone());
            true
        })
    }

    fn apply_theme(&self, profile: &Profile) {
        let colors = self
            .themes
            .display_colors(profile.equipped(EquipCategory::Theme));
        self.colors.send_if_modified(|current| {
            if *current == colors {
                return false;
            }
            *current = colors;
            true
        });
    }

    /// Reload the profile on gold, claim and equip events until `cancel`
    /// fires.
    pub fn spawn_listeners(&self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        let on_gold = {
            let this = self.clone();
            spawn_listener(self.bus.gold().subscribe(), cancel.clone(), move |event| {
                let this = this.clone();
                async move {
                    tracing::debug!(delta = event.delta, "Gold changed");
                    this.reload().await
                }
            })
        };
        let on_claim = {
            let this = self.clone();
            spawn_listener(
                self.bus.mission_claimed().subscribe(),
                cancel.clone(),
                move |event| {
                    let this = this.clone();
                    async move {
                        tracing::debug!(mission_id = event.mission_id, xp = event.xp_reward, "Mission claimed");
                        this.reload().await
                    }
                },
            )
        };
        let on_equip = {
            let this = self.clone();
            spawn_listener(self.bus.inventory().subscribe(), cancel.clone(), move |event| {
                let this = this.clone();
                async move {
                    tracing::debug!(category = event.category.as_str(), item = %event.item_name, "Equipped item changed");
                    this.reload().await
                }
            })
        };
        vec![on_gold, on_claim, on_equip]
    }

    async fn reload(&self) -> anyhow::Result<()> {
        if self.session.is_guest() {
            return Ok(());
        }
        self.load().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dexquest_core::theme::DEFAULT_THEME_COLORS;
    use dexquest_db::MemoryStore;
    use dexquest_events::events::GoldChanged;

    use super::*;

    fn service(theme_colors: Option<&str>) -> ProfileService {
        let store = MemoryStore::new().with_user(Profile {
            user_id: "ash".into(),
            gold: 500,
            theme_colors: theme_colors.map(str::to_string),
            ..Default::default()
        });
        ProfileService::new(
            Arc::new(store),
            Arc::new(EventBus::default()),
            Session::signed_in("ash"),
            Arc::new(ThemeCatalog::default()),
        )
    }

    #[tokio::test]
    async fn load_resolves_named_theme() {
        let svc = service(Some("Midnight"));
        let mut updates = svc.bus.profile().subscribe();

        svc.load().await.unwrap();

        assert_eq!(svc.display_colors(), vec!["#0B132B", "#0B132B"]);
        assert_eq!(
            updates.try_recv(),
            Some(ProfileUpdated {
                user_id: "ash".into()
            })
        );
    }

    #[tokio::test]
    async fn sentinel_theme_uses_default_palette() {
        let svc = service(Some("theme_default"));
        svc.load().await.unwrap();
        assert_eq!(svc.display_colors(), DEFAULT_THEME_COLORS.to_vec());
    }

    #[tokio::test]
    async fn stale_load_is_not_displayed() {
        let svc = service(None);
        svc.load().await.unwrap();
        let shown = svc.profile().unwrap();

        let older = Profile {
            gold: 9999,
            ..shown.clone()
        };
        assert!(!svc.publish_profile(1, &older));
        assert_eq!(svc.profile(), Some(shown));
    }

    #[tokio::test]
    async fn gold_event_reloads_from_store() {
        let store = Arc::new(MemoryStore::new().with_user(Profile {
            user_id: "ash".into(),
            gold: 500,
            ..Default::default()
        }));
        let svc = ProfileService::new(
            Arc::clone(&store) as Arc<dyn DataStore>,
            Arc::new(EventBus::default()),
            Session::signed_in("ash"),
            Arc::new(ThemeCatalog::default()),
        );
        svc.load().await.unwrap();
        let cancel = CancellationToken::new();
        let listeners = svc.spawn_listeners(&cancel);

        // A delta that disagrees with the store must not leak into the profile.
        let mut updates = svc.bus.profile().subscribe();
        svc.bus.gold().publish(GoldChanged { delta: 1000 });
        tokio::time::timeout(std::time::Duration::from_secs(5), updates.recv())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(svc.profile().unwrap().gold, 500);

        cancel.cancel();
        for handle in listeners {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn guest_load_requires_sign_in() {
        let svc = ProfileService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(EventBus::default()),
            Session::Guest,
            Arc::new(ThemeCatalog::default()),
        );
        assert!(svc.load().await.is_err());
        assert!(svc.reload().await.is_ok());
        assert!(svc.profile().is_none());
    }
}
