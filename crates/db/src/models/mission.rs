//! Mission catalog and progress rows.

use dexquest_core::missions::{Mission, MissionProgress, MissionRarity, ProgressStatus};
use dexquest_core::types::DbId;
use sqlx::FromRow;

use crate::error::StoreError;

/// A row from the `missions` table.
#[derive(Debug, Clone, FromRow)]
pub struct MissionRow {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub rarity: String,
    pub requirement_value: i64,
    pub gold_reward: i64,
    pub xp_reward: i64,
    pub prerequisite_mission_id: Option<DbId>,
    pub sort_order: i32,
}

impl TryFrom<MissionRow> for Mission {
    type Error = StoreError;

    fn try_from(row: MissionRow) -> Result<Self, Self::Error> {
        let rarity = MissionRarity::from_str_value(&row.rarity).map_err(StoreError::InvalidData)?;
        Ok(Mission {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            rarity,
            requirement_value: row.requirement_value,
            gold_reward: row.gold_reward,
            xp_reward: row.xp_reward,
            prerequisite_mission_id: row.prerequisite_mission_id,
            sort_order: row.sort_order,
        })
    }
}

/// A row from the `user_mission_progress` table.
#[derive(Debug, Clone, FromRow)]
pub struct MissionProgressRow {
    pub mission_id: DbId,
    pub current_value: i64,
    pub status: String,
}

impl TryFrom<MissionProgressRow> for MissionProgress {
    type Error = StoreError;

    fn try_from(row: MissionProgressRow) -> Result<Self, Self::Error> {
        let status = ProgressStatus::from_str_value(&row.status).map_err(StoreError::InvalidData)?;
        Ok(MissionProgress {
            mission_id: row.mission_id,
            current_value: row.current_value,
            status,
        })
    }
}
