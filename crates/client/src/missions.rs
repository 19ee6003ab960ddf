//! The mission board: sync, reconcile and claim.
//!
//! Each load runs `ensure roots -> sync counters -> fetch -> reconcile` and
//! publishes the resulting [`MissionBoard`] on a watch channel. Loads are
//! stamped with a sequence number; a board is only published when its stamp
//! is newer than the one on display, so a slow load started before a fast
//! one can never overwrite the fresher result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dexquest_core::missions::{partition, reconcile, validate_catalog, MissionPartition, RewardGrant};
use dexquest_core::types::DbId;
use dexquest_db::DataStore;
use dexquest_events::events::{GoldChanged, MissionClaimed};
use dexquest_events::{spawn_listener, EventBus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// A reconciled mission board and the load that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissionBoard {
    /// Sequence stamp of the load; `0` before the first load.
    pub seq: u64,
    pub partition: MissionPartition,
}

#[derive(Clone)]
pub struct MissionService {
    store: Arc<dyn DataStore>,
    bus: Arc<EventBus>,
    session: Session,
    board: Arc<watch::Sender<MissionBoard>>,
    last_seq: Arc<AtomicU64>,
    claiming: Arc<watch::Sender<Option<DbId>>>,
}

impl MissionService {
    pub fn new(store: Arc<dyn DataStore>, bus: Arc<EventBus>, session: Session) -> Self {
        let (board, _) = watch::channel(MissionBoard::default());
        let (claiming, _) = watch::channel(None);
        Self {
            store,
            bus,
            session,
            board: Arc::new(board),
            last_seq: Arc::new(AtomicU64::new(0)),
            claiming: Arc::new(claiming),
        }
    }

    /// The board on display.
    pub fn board(&self) -> MissionBoard {
        self.board.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MissionBoard> {
        self.board.subscribe()
    }

    /// The mission whose claim is in flight, for disabling its button.
    pub fn claiming_mission_id(&self) -> watch::Receiver<Option<DbId>> {
        self.claiming.subscribe()
    }

    /// Sync and reconcile the board.
    ///
    /// Returns the board this load produced, which is only displayed when no
    /// newer load has been displayed already. On error the displayed board
    /// is left untouched.
    pub async fn load(&self) -> ClientResult<MissionBoard> {
        let seq = self.last_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let (missions, progress) = match self.session.user_id() {
            None => (self.store.fetch_missions_catalog().await?, Vec::new()),
            Some(user_id) => {
                self.store.ensure_root_missions_initialized(user_id).await?;
                self.store.sync_mission_counters(user_id).await?;
                tokio::try_join!(
                    self.store.fetch_missions_catalog(),
                    self.store.fetch_user_mission_progress(user_id),
                )?
            }
        };

        if let Err(e) = validate_catalog(&missions) {
            tracing::error!(error = %e, "Mission catalog is misconfigured");
        }

        let board = MissionBoard {
            seq,
            partition: partition(reconcile(&missions, &progress)),
        };
        if self.publish_board(board.clone()) {
            tracing::debug!(
                seq,
                active = board.partition.active.len(),
                completed = board.partition.completed.len(),
                locked = board.partition.locked.len(),
                "Mission board updated"
            );
        } else {
            tracing::debug!(seq, "Discarded stale mission board");
        }
        Ok(board)
    }

    /// Claim a mission's reward.
    ///
    /// Only one claim runs at a time; a second call while one is in flight
    /// fails with [`ClientError::ClaimInFlight`]. Whether the reward is
    /// granted is decided by the store's atomic claim.
    pub async fn claim_reward(&self, mission_id: DbId) -> ClientResult<RewardGrant> {
        let user_id = self.session.require_user()?;
        let _guard = self.begin_claim(mission_id)?;

        let grant = self
            .store
            .atomic_claim(user_id, mission_id)
            .await
            .inspect_err(|e| tracing::warn!(user_id, mission_id, error = %e, "Claim rejected"))?;

        tracing::info!(
            user_id,
            mission_id,
            gold = grant.gold_reward,
            xp = grant.xp_reward,
            "Mission reward claimed"
        );
        self.bus.publish_claimed(MissionClaimed {
            mission_id,
            gold_reward: grant.gold_reward,
            xp_reward: grant.xp_reward,
        });
        if grant.gold_reward > 0 {
            self.bus.gold().publish(GoldChanged {
                delta: grant.gold_reward,
            });
        }

        if let Err(e) = self.load().await {
            tracing::warn!(error = %e, "Failed to reload missions after claim");
        }
        Ok(grant)
    }

    /// Reload on mission-progress and full-refresh events until `cancel`
    /// fires.
    pub fn spawn_listeners(&self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        let on_progress = {
            let this = self.clone();
            spawn_listener(
                self.bus.mission_progress().subscribe(),
                cancel.clone(),
                move |event| {
                    let this = this.clone();
                    async move {
                        tracing::debug!(trigger = ?event.trigger, "Mission progress may have changed");
                        this.load().await?;
                        Ok(())
                    }
                },
            )
        };
        let on_refresh = {
            let this = self.clone();
            spawn_listener(self.bus.refresh().subscribe(), cancel.clone(), move |_| {
                let this = this.clone();
                async move {
                    this.load().await?;
                    Ok(())
                }
            })
        };
        vec![on_progress, on_refresh]
    }

    fn begin_claim(&self, mission_id: DbId) -> ClientResult<ClaimGuard> {
        let mut running = None;
        self.claiming.send_if_modified(|current| match *current {
            Some(id) => {
                running = Some(id);
                false
            }
            None => {
                *current = Some(mission_id);
                true
            }
        });
        match running {
            Some(id) => Err(ClientError::ClaimInFlight(id)),
            None => Ok(ClaimGuard {
                claiming: Arc::clone(&self.claiming),
            }),
        }
    }

    fn publish_board(&self, board: MissionBoard) -> bool {
        self.board.send_if_modified(|current| {
            if board.seq <= current.seq {
                return false;
            }
            *current = board;
            true
        })
    }
}

/// Clears the claim-in-flight marker on every exit path.
#[derive(Debug)]
struct ClaimGuard {
    claiming: Arc<watch::Sender<Option<DbId>>>,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        self.claiming.send_replace(None);
    }
}
