//! Repository for the `missions` and `user_mission_progress` tables.

use dexquest_core::missions::{MissionProgress, RewardGrant, STATUS_ACTIVE, STATUS_COMPLETED};
use dexquest_core::profile::XP_PER_LEVEL;
use dexquest_core::types::DbId;
use sqlx::PgPool;

use crate::models::mission::{MissionProgressRow, MissionRow};

/// Column list for `missions` queries.
const MISSION_COLUMNS: &str = "id, title, description, category, rarity, requirement_value, \
    gold_reward, xp_reward, prerequisite_mission_id, sort_order";

/// Result of a conditional claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Granted(RewardGrant),
    AlreadyClaimed,
    NotEligible,
}

/// Provides read/write operations for missions and per-user progress.
pub struct MissionRepo;

impl MissionRepo {
    /// The full catalog ordered for display.
    pub async fn list_catalog(pool: &PgPool) -> Result<Vec<MissionRow>, sqlx::Error> {
        let query = format!("SELECT {MISSION_COLUMNS} FROM missions ORDER BY sort_order, id");
        sqlx::query_as::<_, MissionRow>(&query).fetch_all(pool).await
    }

    pub async fn list_progress(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<MissionProgressRow>, sqlx::Error> {
        sqlx::query_as::<_, MissionProgressRow>(
            "SELECT mission_id, current_value, status \
             FROM user_mission_progress WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Insert rows that do not exist yet; existing rows are untouched.
    pub async fn insert_missing(
        pool: &PgPool,
        user_id: &str,
        rows: &[MissionProgress],
    ) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }
        let (ids, values) = split_rows(rows);
        let result = sqlx::query(
            "INSERT INTO user_mission_progress (user_id, mission_id, current_value, status) \
             SELECT $1, m, v, $4 FROM UNNEST($2::BIGINT[], $3::BIGINT[]) AS t (m, v) \
             ON CONFLICT (user_id, mission_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(&ids)
        .bind(&values)
        .bind(STATUS_ACTIVE)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Upsert counters, only ever raising `current_value` on active rows.
    pub async fn raise_counters(
        pool: &PgPool,
        user_id: &str,
        rows: &[MissionProgress],
    ) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }
        let (ids, values) = split_rows(rows);
        let result = sqlx::query(
            "INSERT INTO user_mission_progress (user_id, mission_id, current_value, status) \
             SELECT $1, m, v, $4 FROM UNNEST($2::BIGINT[], $3::BIGINT[]) AS t (m, v) \
             ON CONFLICT (user_id, mission_id) DO UPDATE \
                SET current_value = GREATEST(user_mission_progress.current_value, EXCLUDED.current_value), \
                    updated_at = NOW() \
                WHERE user_mission_progress.status = $4",
        )
        .bind(user_id)
        .bind(&ids)
        .bind(&values)
        .bind(STATUS_ACTIVE)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Atomically complete an eligible mission and credit its reward.
    ///
    /// The status flip is a single conditional `UPDATE`, so of two
    /// concurrent claims exactly one sees a returned row.
    pub async fn claim(
        pool: &PgPool,
        user_id: &str,
        mission_id: DbId,
    ) -> Result<ClaimOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let granted: Option<(i64, i64)> = sqlx::query_as(
            "UPDATE user_mission_progress p \
             SET status = $3, completed_at = NOW(), updated_at = NOW() \
             FROM missions m \
             WHERE m.id = p.mission_id \
               AND p.user_id = $1 AND p.mission_id = $2 \
               AND p.status = $4 \
               AND p.current_value >= m.requirement_value \
             RETURNING m.gold_reward, m.xp_reward",
        )
        .bind(user_id)
        .bind(mission_id)
        .bind(STATUS_COMPLETED)
        .bind(STATUS_ACTIVE)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((gold_reward, xp_reward)) = granted else {
            let status: Option<String> = sqlx::query_scalar(
                "SELECT status FROM user_mission_progress WHERE user_id = $1 AND mission_id = $2",
            )
            .bind(user_id)
            .bind(mission_id)
            .fetch_optional(&mut *tx)
            .await?;
            tx.rollback().await?;

            return Ok(match status.as_deref() {
                Some(STATUS_COMPLETED) => ClaimOutcome::AlreadyClaimed,
                _ => ClaimOutcome::NotEligible,
            });
        };

        sqlx::query(
            "UPDATE profiles \
             SET gold = gold + $2, xp = xp + $3, level = (xp + $3) / $4 + 1, updated_at = NOW() \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(gold_reward)
        .bind(xp_reward)
        .bind(XP_PER_LEVEL)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ClaimOutcome::Granted(RewardGrant {
            gold_reward,
            xp_reward,
        }))
    }
}

fn split_rows(rows: &[MissionProgress]) -> (Vec<DbId>, Vec<i64>) {
    rows.iter()
        .map(|r| (r.mission_id, r.current_value.max(0)))
        .unzip()
}
