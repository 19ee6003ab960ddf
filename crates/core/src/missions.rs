//! Mission catalog, per-user progress, and the reconciliation pass that
//! derives what the mission board shows.
//!
//! The remote store only ever persists `active` or `completed`. Whether a
//! mission is `locked` is derived on every [`reconcile`] call from the
//! catalog's prerequisite chain and the current progress snapshot, which is
//! what lets a mission unlock itself as soon as its prerequisite completes.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::entity::{generation_range, Pokemon};
use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Persisted progress status values.
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_COMPLETED: &str = "completed";

/// All valid persisted status strings. `locked` is intentionally absent.
pub const VALID_PROGRESS_STATUSES: &[&str] = &[STATUS_ACTIVE, STATUS_COMPLETED];

/// Mission rarity tags.
pub const RARITY_COMMON: &str = "common";
pub const RARITY_RARE: &str = "rare";
pub const RARITY_EPIC: &str = "epic";
pub const RARITY_LEGENDARY: &str = "legendary";

/// All valid rarity strings.
pub const VALID_RARITIES: &[&str] = &[RARITY_COMMON, RARITY_RARE, RARITY_EPIC, RARITY_LEGENDARY];

/// Counter-driven category tags. `type:` and `generation:` take a suffix.
pub const CATEGORY_COLLECTION: &str = "collection";
pub const CATEGORY_FAVORITE: &str = "favorite";
pub const CATEGORY_TEAM: &str = "team";
pub const CATEGORY_SHOP: &str = "shop";
pub const CATEGORY_TYPE_PREFIX: &str = "type:";
pub const CATEGORY_GENERATION_PREFIX: &str = "generation:";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Reward tier of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl MissionRarity {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            RARITY_COMMON => Ok(Self::Common),
            RARITY_RARE => Ok(Self::Rare),
            RARITY_EPIC => Ok(Self::Epic),
            RARITY_LEGENDARY => Ok(Self::Legendary),
            _ => Err(format!(
                "Invalid mission rarity '{s}'. Must be one of: {}",
                VALID_RARITIES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => RARITY_COMMON,
            Self::Rare => RARITY_RARE,
            Self::Epic => RARITY_EPIC,
            Self::Legendary => RARITY_LEGENDARY,
        }
    }
}

/// Status as last written by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Active,
    Completed,
}

impl ProgressStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_ACTIVE => Ok(Self::Active),
            STATUS_COMPLETED => Ok(Self::Completed),
            _ => Err(format!(
                "Invalid progress status '{s}'. Must be one of: {}",
                VALID_PROGRESS_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => STATUS_ACTIVE,
            Self::Completed => STATUS_COMPLETED,
        }
    }
}

/// Status the mission board displays. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveStatus {
    Active,
    Locked,
    Completed,
}

/// What a mission counts, parsed from its `category` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissionCategory {
    /// Number of caught entities.
    Collection,
    /// Number of favorited entities.
    Favorite,
    /// Number of teams created.
    Team,
    /// Number of shop purchases.
    Shop,
    /// Number of caught entities carrying a type tag.
    Type(String),
    /// Number of caught entities within a generation's id range.
    Generation(u8),
    /// A category whose counter is maintained elsewhere.
    Other(String),
}

impl MissionCategory {
    /// Parse a category tag. Unknown or malformed tags become [`Self::Other`].
    pub fn parse(tag: &str) -> Self {
        match tag {
            CATEGORY_COLLECTION => Self::Collection,
            CATEGORY_FAVORITE => Self::Favorite,
            CATEGORY_TEAM => Self::Team,
            CATEGORY_SHOP => Self::Shop,
            _ => {
                if let Some(type_tag) = tag.strip_prefix(CATEGORY_TYPE_PREFIX) {
                    if !type_tag.is_empty() {
                        return Self::Type(type_tag.to_lowercase());
                    }
                }
                if let Some(generation) = tag
                    .strip_prefix(CATEGORY_GENERATION_PREFIX)
                    .and_then(|g| g.parse::<u8>().ok())
                    .filter(|g| generation_range(*g).is_some())
                {
                    return Self::Generation(generation);
                }
                Self::Other(tag.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// Immutable mission catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub rarity: MissionRarity,
    pub requirement_value: i64,
    pub gold_reward: i64,
    pub xp_reward: i64,
    pub prerequisite_mission_id: Option<DbId>,
    pub sort_order: i32,
}

impl Mission {
    pub fn is_root(&self) -> bool {
        self.prerequisite_mission_id.is_none()
    }

    pub fn category_kind(&self) -> MissionCategory {
        MissionCategory::parse(&self.category)
    }

    pub fn reward(&self) -> RewardGrant {
        RewardGrant {
            gold_reward: self.gold_reward,
            xp_reward: self.xp_reward,
        }
    }
}

/// Per-user progress row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionProgress {
    pub mission_id: DbId,
    pub current_value: i64,
    pub status: ProgressStatus,
}

/// Gold and XP granted by a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardGrant {
    pub gold_reward: i64,
    pub xp_reward: i64,
}

/// A mission joined with its derived display state.
///
/// Recreated wholesale by every [`reconcile`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionWithProgress {
    pub mission: Mission,
    pub progress: Option<MissionProgress>,
    pub status: EffectiveStatus,
    /// Completion fraction in `[0, 1]`.
    pub progress_percentage: f64,
    pub is_completed: bool,
    pub is_locked: bool,
    pub can_claim: bool,
}

impl MissionWithProgress {
    pub fn current_value(&self) -> i64 {
        self.progress
            .as_ref()
            .map(|p| p.current_value.max(0))
            .unwrap_or(0)
    }
}

/// The mission board split into its three display buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MissionPartition {
    pub active: Vec<MissionWithProgress>,
    pub completed: Vec<MissionWithProgress>,
    pub locked: Vec<MissionWithProgress>,
}

impl MissionPartition {
    pub fn total(&self) -> usize {
        self.active.len() + self.completed.len() + self.locked.len()
    }

    /// Active missions whose reward can be claimed right now.
    pub fn claimable(&self) -> impl Iterator<Item = &MissionWithProgress> {
        self.active.iter().filter(|m| m.can_claim)
    }
}

/// Real counts the store derives mission counters from.
#[derive(Debug, Clone, Default)]
pub struct CollectionSnapshot {
    /// Every entity the user has caught, with its type tags.
    pub caught: Vec<Pokemon>,
    pub favorite_count: i64,
    pub team_count: i64,
    pub purchase_count: i64,
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Completion fraction for a counter against its requirement.
///
/// A requirement of zero or less is trivially complete.
pub fn progress_percentage(current_value: i64, requirement_value: i64) -> f64 {
    if requirement_value <= 0 {
        return 1.0;
    }
    (current_value.max(0) as f64 / requirement_value as f64).clamp(0.0, 1.0)
}

/// Derive the effective status of a single mission.
///
/// Precedence: completed row, active row, root mission, completed
/// prerequisite, otherwise locked.
pub fn effective_status(
    mission: &Mission,
    progress: Option<&MissionProgress>,
    completed_ids: &HashSet<DbId>,
) -> EffectiveStatus {
    match progress.map(|p| p.status) {
        Some(ProgressStatus::Completed) => EffectiveStatus::Completed,
        Some(ProgressStatus::Active) => EffectiveStatus::Active,
        None => match mission.prerequisite_mission_id {
            None => EffectiveStatus::Active,
            Some(prerequisite) if completed_ids.contains(&prerequisite) => EffectiveStatus::Active,
            Some(_) => EffectiveStatus::Locked,
        },
    }
}

/// Reconcile the mission catalog against a user's progress rows.
///
/// Pure and total: missing progress is "no progress", duplicate rows are
/// collapsed (completed wins, then the highest counter), and the output keeps
/// catalog order.
pub fn reconcile(missions: &[Mission], progress: &[MissionProgress]) -> Vec<MissionWithProgress> {
    let by_mission = index_progress(progress);
    let completed_ids: HashSet<DbId> = by_mission
        .values()
        .filter(|p| p.status == ProgressStatus::Completed)
        .map(|p| p.mission_id)
        .collect();

    missions
        .iter()
        .map(|mission| {
            let row = by_mission.get(&mission.id).copied();
            let status = effective_status(mission, row, &completed_ids);
            let current_value = row.map(|p| p.current_value.max(0)).unwrap_or(0);

            MissionWithProgress {
                mission: mission.clone(),
                progress: row.cloned(),
                status,
                progress_percentage: progress_percentage(current_value, mission.requirement_value),
                is_completed: status == EffectiveStatus::Completed,
                is_locked: status == EffectiveStatus::Locked,
                can_claim: status == EffectiveStatus::Active
                    && current_value >= mission.requirement_value,
            }
        })
        .collect()
}

/// Collapse progress rows to one per mission.
fn index_progress(progress: &[MissionProgress]) -> HashMap<DbId, &MissionProgress> {
    let mut by_mission: HashMap<DbId, &MissionProgress> = HashMap::with_capacity(progress.len());
    for row in progress {
        by_mission
            .entry(row.mission_id)
            .and_modify(|existing| {
                if outranks(row, existing) {
                    *existing = row;
                }
            })
            .or_insert(row);
    }
    by_mission
}

fn outranks(candidate: &MissionProgress, existing: &MissionProgress) -> bool {
    match (candidate.status, existing.status) {
        (ProgressStatus::Completed, ProgressStatus::Active) => true,
        (ProgressStatus::Active, ProgressStatus::Completed) => false,
        _ => candidate.current_value > existing.current_value,
    }
}

/// Split a reconciled board into active / completed / locked buckets.
///
/// Every mission lands in exactly one bucket; order within a bucket follows
/// the input.
pub fn partition(board: Vec<MissionWithProgress>) -> MissionPartition {
    let mut result = MissionPartition::default();
    for mission in board {
        if mission.is_completed {
            result.completed.push(mission);
        } else if mission.is_locked {
            result.locked.push(mission);
        } else {
            result.active.push(mission);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Catalog validation
// ---------------------------------------------------------------------------

/// Check a catalog for duplicate ids and prerequisite cycles.
///
/// [`reconcile`] does not require a valid catalog; missions on a cycle are
/// simply derived as locked. This check lets the caller surface the
/// configuration error instead.
pub fn validate_catalog(missions: &[Mission]) -> Result<(), CoreError> {
    let mut prerequisites: HashMap<DbId, Option<DbId>> = HashMap::with_capacity(missions.len());
    for mission in missions {
        if mission.requirement_value < 0 {
            return Err(CoreError::Validation(format!(
                "Mission {} has a negative requirement value",
                mission.id
            )));
        }
        if prerequisites
            .insert(mission.id, mission.prerequisite_mission_id)
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "Duplicate mission id {}",
                mission.id
            )));
        }
    }

    let cycle = find_cycle_members(&prerequisites);
    if cycle.is_empty() {
        Ok(())
    } else {
        Err(CoreError::PrerequisiteCycle { mission_ids: cycle })
    }
}

/// Every mission id that sits on a prerequisite cycle, sorted.
///
/// Each mission has at most one prerequisite, so walking the chain from each
/// unvisited mission either leaves the catalog, reaches an already-finished
/// mission, or re-enters the current path (a cycle).
fn find_cycle_members(prerequisites: &HashMap<DbId, Option<DbId>>) -> Vec<DbId> {
    let mut finished: HashSet<DbId> = HashSet::new();
    let mut members: Vec<DbId> = Vec::new();

    let mut starts: Vec<DbId> = prerequisites.keys().copied().collect();
    starts.sort_unstable();

    for start in starts {
        let mut path: Vec<DbId> = Vec::new();
        let mut on_path: HashSet<DbId> = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if finished.contains(&id) || !prerequisites.contains_key(&id) {
                break;
            }
            if on_path.contains(&id) {
                if let Some(pos) = path.iter().position(|&p| p == id) {
                    members.extend_from_slice(&path[pos..]);
                }
                break;
            }
            path.push(id);
            on_path.insert(id);
            current = prerequisites.get(&id).copied().flatten();
        }

        finished.extend(path);
    }

    members.sort_unstable();
    members
}

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// The real count a counter-driven mission should display.
///
/// Returns `None` for [`MissionCategory::Other`], whose counters are not
/// derived from the collection.
pub fn mission_counter(category: &MissionCategory, snapshot: &CollectionSnapshot) -> Option<i64> {
    let count = match category {
        MissionCategory::Collection => snapshot.caught.len() as i64,
        MissionCategory::Favorite => snapshot.favorite_count,
        MissionCategory::Team => snapshot.team_count,
        MissionCategory::Shop => snapshot.purchase_count,
        MissionCategory::Type(tag) => snapshot.caught.iter().filter(|p| p.has_type(tag)).count() as i64,
        MissionCategory::Generation(generation) => {
            let (lo, hi) = generation_range(*generation)?;
            snapshot
                .caught
                .iter()
                .filter(|p| (lo..=hi).contains(&p.id))
                .count() as i64
        }
        MissionCategory::Other(_) => return None,
    };
    Some(count)
}

// ---------------------------------------------------------------------------
// Sync planning
// ---------------------------------------------------------------------------

/// Rows to insert so every root mission has a progress row.
pub fn plan_root_initialization(
    missions: &[Mission],
    progress: &[MissionProgress],
) -> Vec<MissionProgress> {
    let existing: HashSet<DbId> = progress.iter().map(|p| p.mission_id).collect();
    missions
        .iter()
        .filter(|m| m.is_root() && !existing.contains(&m.id))
        .map(|m| MissionProgress {
            mission_id: m.id,
            current_value: 0,
            status: ProgressStatus::Active,
        })
        .collect()
}

/// Rows a counter sync should upsert.
///
/// Active rows move up to the real count (never down). Missions without a
/// row get an active one once they are unlocked, so the store catches up
/// with what [`reconcile`] already shows. Completed rows are left alone.
pub fn plan_counter_sync(
    missions: &[Mission],
    progress: &[MissionProgress],
    snapshot: &CollectionSnapshot,
) -> Vec<MissionProgress> {
    let by_mission = index_progress(progress);
    let completed_ids: HashSet<DbId> = by_mission
        .values()
        .filter(|p| p.status == ProgressStatus::Completed)
        .map(|p| p.mission_id)
        .collect();

    missions
        .iter()
        .filter_map(|mission| {
            let counter = mission_counter(&mission.category_kind(), snapshot);
            match by_mission.get(&mission.id) {
                Some(row) if row.status == ProgressStatus::Completed => None,
                Some(row) => {
                    let counter = counter?;
                    (counter > row.current_value).then(|| MissionProgress {
                        current_value: counter,
                        ..(*row).clone()
                    })
                }
                None => {
                    let unlocked = match mission.prerequisite_mission_id {
                        None => true,
                        Some(prerequisite) => completed_ids.contains(&prerequisite),
                    };
                    unlocked.then(|| MissionProgress {
                        mission_id: mission.id,
                        current_value: counter.unwrap_or(0),
                        status: ProgressStatus::Active,
                    })
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn mission(id: DbId, requirement_value: i64, prerequisite: Option<DbId>) -> Mission {
        Mission {
            id,
            title: format!("Mission {id}"),
            description: String::new(),
            category: CATEGORY_COLLECTION.to_string(),
            rarity: MissionRarity::Common,
            requirement_value,
            gold_reward: 100,
            xp_reward: 50,
            prerequisite_mission_id: prerequisite,
            sort_order: id as i32,
        }
    }

    fn row(mission_id: DbId, current_value: i64, status: ProgressStatus) -> MissionProgress {
        MissionProgress {
            mission_id,
            current_value,
            status,
        }
    }

    // -- Status derivation --------------------------------------------------

    #[test]
    fn root_mission_without_progress_is_active() {
        let board = reconcile(&[mission(1, 10, None)], &[]);
        assert_eq!(board[0].status, EffectiveStatus::Active);
        assert!(!board[0].is_locked);
        assert!(!board[0].can_claim);
    }

    #[test]
    fn dependant_without_completed_prerequisite_is_locked() {
        let missions = [mission(1, 10, None), mission(2, 10, Some(1))];
        let board = reconcile(&missions, &[row(1, 3, ProgressStatus::Active)]);
        assert!(board[1].is_locked);
        assert!(!board[1].can_claim);
    }

    #[test]
    fn completed_prerequisite_unlocks_dependant_without_row() {
        let missions = [mission(1, 10, None), mission(2, 10, Some(1))];
        let board = reconcile(&missions, &[row(1, 10, ProgressStatus::Completed)]);
        assert!(board[0].is_completed);
        assert_eq!(board[1].status, EffectiveStatus::Active);
        assert!(!board[1].is_locked);
    }

    #[test]
    fn persisted_status_wins_over_prerequisite_logic() {
        let missions = [mission(1, 10, None), mission(2, 5, Some(1))];
        let board = reconcile(&missions, &[row(2, 5, ProgressStatus::Active)]);
        assert_eq!(board[1].status, EffectiveStatus::Active);
        assert!(board[1].can_claim);

        let board = reconcile(&missions, &[row(2, 5, ProgressStatus::Completed)]);
        assert!(board[1].is_completed);
        assert!(!board[1].can_claim);
    }

    #[test]
    fn missing_prerequisite_keeps_dependant_locked() {
        let board = reconcile(&[mission(2, 1, Some(99))], &[]);
        assert!(board[0].is_locked);
    }

    // -- Claimability and percentage ---------------------------------------

    #[test]
    fn can_claim_is_exact_comparison() {
        let missions = [mission(1, 10, None)];

        let board = reconcile(&missions, &[row(1, 10, ProgressStatus::Active)]);
        assert!(board[0].can_claim);
        assert_eq!(board[0].progress_percentage, 1.0);

        let board = reconcile(&missions, &[row(1, 9, ProgressStatus::Active)]);
        assert!(!board[0].can_claim);
        assert!((board[0].progress_percentage - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_requirement_is_trivially_complete() {
        assert_eq!(progress_percentage(0, 0), 1.0);
        assert_eq!(progress_percentage(42, 0), 1.0);
        assert_eq!(progress_percentage(5, -3), 1.0);
    }

    #[test]
    fn percentage_is_clamped() {
        assert_eq!(progress_percentage(25, 10), 1.0);
        assert_eq!(progress_percentage(-4, 10), 0.0);
    }

    #[test]
    fn duplicate_rows_prefer_completed_then_highest_value() {
        let missions = [mission(1, 10, None)];
        let board = reconcile(
            &missions,
            &[
                row(1, 4, ProgressStatus::Active),
                row(1, 10, ProgressStatus::Completed),
                row(1, 7, ProgressStatus::Active),
            ],
        );
        assert!(board[0].is_completed);

        let board = reconcile(
            &missions,
            &[row(1, 4, ProgressStatus::Active), row(1, 7, ProgressStatus::Active)],
        );
        assert_eq!(board[0].current_value(), 7);
    }

    // -- Partition -----------------------------------------------------------

    #[test]
    fn partition_is_complete_and_disjoint() {
        let missions = [
            mission(1, 10, None),
            mission(2, 10, Some(1)),
            mission(3, 10, Some(2)),
            mission(4, 0, None),
            mission(5, 3, Some(4)),
        ];
        let progress = [
            row(1, 10, ProgressStatus::Completed),
            row(4, 0, ProgressStatus::Completed),
            row(5, 1, ProgressStatus::Active),
        ];

        let parts = partition(reconcile(&missions, &progress));

        assert_eq!(parts.total(), missions.len());
        let ids = |bucket: &[MissionWithProgress]| -> Vec<DbId> {
            bucket.iter().map(|m| m.mission.id).collect()
        };
        assert_eq!(ids(&parts.completed), vec![1, 4]);
        assert_eq!(ids(&parts.active), vec![2, 5]);
        assert_eq!(ids(&parts.locked), vec![3]);
        assert_eq!(parts.claimable().count(), 0);
    }

    // -- Catalog validation ------------------------------------------------

    #[test]
    fn acyclic_catalog_is_valid() {
        let missions = [mission(1, 1, None), mission(2, 1, Some(1)), mission(3, 1, Some(2))];
        assert!(validate_catalog(&missions).is_ok());
    }

    #[test]
    fn cycle_is_reported_with_members() {
        let missions = [
            mission(1, 1, None),
            mission(2, 1, Some(3)),
            mission(3, 1, Some(2)),
            mission(4, 1, Some(2)),
        ];
        assert_matches!(
            validate_catalog(&missions),
            Err(CoreError::PrerequisiteCycle { mission_ids }) if mission_ids == vec![2, 3]
        );

        // Missions on the cycle stay locked rather than crashing reconcile.
        let board = reconcile(&missions, &[]);
        assert!(board[1].is_locked && board[2].is_locked && board[3].is_locked);
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let missions = [mission(7, 1, Some(7))];
        assert_matches!(
            validate_catalog(&missions),
            Err(CoreError::PrerequisiteCycle { mission_ids }) if mission_ids == vec![7]
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let missions = [mission(1, 1, None), mission(1, 2, None)];
        assert_matches!(validate_catalog(&missions), Err(CoreError::Conflict(_)));
    }

    // -- Categories and counters -------------------------------------------

    #[test]
    fn category_parsing() {
        assert_eq!(MissionCategory::parse("collection"), MissionCategory::Collection);
        assert_eq!(
            MissionCategory::parse("type:Fire"),
            MissionCategory::Type("fire".into())
        );
        assert_eq!(MissionCategory::parse("generation:2"), MissionCategory::Generation(2));
        assert_eq!(
            MissionCategory::parse("generation:12"),
            MissionCategory::Other("generation:12".into())
        );
        assert_eq!(MissionCategory::parse("type:"), MissionCategory::Other("type:".into()));
    }

    #[test]
    fn counters_follow_snapshot() {
        let caught = vec![
            Pokemon::new(4, "Charmander", vec!["fire".into()]).unwrap(),
            Pokemon::new(6, "Charizard", vec!["fire".into(), "flying".into()]).unwrap(),
            Pokemon::new(155, "Cyndaquil", vec!["fire".into()]).unwrap(),
            Pokemon::new(7, "Squirtle", vec!["water".into()]).unwrap(),
        ];
        let snapshot = CollectionSnapshot {
            caught,
            favorite_count: 2,
            team_count: 1,
            purchase_count: 3,
        };

        let count = |tag: &str| mission_counter(&MissionCategory::parse(tag), &snapshot);
        assert_eq!(count("collection"), Some(4));
        assert_eq!(count("favorite"), Some(2));
        assert_eq!(count("team"), Some(1));
        assert_eq!(count("shop"), Some(3));
        assert_eq!(count("type:fire"), Some(3));
        assert_eq!(count("generation:1"), Some(3));
        assert_eq!(count("generation:2"), Some(1));
        assert_eq!(count("daily_login"), None);
    }

    #[test]
    fn status_strings_round_trip() {
        for s in VALID_PROGRESS_STATUSES {
            assert_eq!(ProgressStatus::from_str_value(s).unwrap().as_str(), *s);
        }
        assert!(ProgressStatus::from_str_value("locked").is_err());
        for s in VALID_RARITIES {
            assert_eq!(MissionRarity::from_str_value(s).unwrap().as_str(), *s);
        }
    }

    // -- Sync planning -------------------------------------------------------

    #[test]
    fn root_initialization_only_fills_missing_roots() {
        let missions = [mission(1, 5, None), mission(2, 5, None), mission(3, 5, Some(1))];
        let rows = plan_root_initialization(&missions, &[row(1, 2, ProgressStatus::Active)]);
        assert_eq!(rows, vec![row(2, 0, ProgressStatus::Active)]);
    }

    #[test]
    fn counter_sync_is_monotonic_and_unlocks() {
        let missions = [
            mission(1, 3, None),
            mission(2, 10, Some(1)),
            mission(3, 10, Some(2)),
            mission(4, 1, None),
        ];
        let progress = [
            row(1, 3, ProgressStatus::Completed),
            row(4, 9, ProgressStatus::Active),
        ];
        let snapshot = CollectionSnapshot {
            caught: vec![
                Pokemon::new(1, "Bulbasaur", vec!["grass".into()]).unwrap(),
                Pokemon::new(4, "Charmander", vec!["fire".into()]).unwrap(),
            ],
            ..Default::default()
        };

        let rows = plan_counter_sync(&missions, &progress, &snapshot);

        // Mission 2 unlocks with the real count; 3 stays locked; 4 never
        // moves backwards from 9 to 2.
        assert_eq!(rows, vec![row(2, 2, ProgressStatus::Active)]);
    }

    #[test]
    fn counter_sync_raises_active_rows() {
        let missions = [mission(1, 10, None)];
        let snapshot = CollectionSnapshot {
            caught: vec![Pokemon::new(25, "Pikachu", vec!["electric".into()]).unwrap()],
            ..Default::default()
        };
        let rows = plan_counter_sync(&missions, &[row(1, 0, ProgressStatus::Active)], &snapshot);
        assert_eq!(rows, vec![row(1, 1, ProgressStatus::Active)]);
    }
}
