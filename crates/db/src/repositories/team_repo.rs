//! Repository for the `teams` table.

use dexquest_core::types::DbId;
use sqlx::PgPool;

use crate::models::shop::TeamRow;

/// Provides read/write operations for teams.
pub struct TeamRepo;

impl TeamRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: &str,
        name: &str,
        member_ids: &[DbId],
    ) -> Result<TeamRow, sqlx::Error> {
        sqlx::query_as::<_, TeamRow>(
            "INSERT INTO teams (user_id, name, member_ids) VALUES ($1, $2, $3) \
             RETURNING id, name, member_ids, created_at",
        )
        .bind(user_id)
        .bind(name)
        .bind(member_ids)
        .fetch_one(pool)
        .await
    }

    /// Delete a team owned by `user_id`. Returns `false` if none matched.
    pub async fn delete(pool: &PgPool, user_id: &str, team_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM teams WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
