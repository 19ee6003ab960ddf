//! Repository for the `profiles` table.

use sqlx::PgPool;

use crate::models::profile::ProfileRow;

/// Column list for `profiles` queries.
const PROFILE_COLUMNS: &str = "user_id, display_name, gold, xp, level, \
    equipped_avatar_frame, equipped_title, theme_colors, updated_at";

/// Provides read/write operations for user profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find(pool: &PgPool, user_id: &str) -> Result<Option<ProfileRow>, sqlx::Error> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1");
        sqlx::query_as::<_, ProfileRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Write one equip slot. `column` must be one of the `equipped_*` /
    /// `theme_colors` columns; it is never user input.
    pub async fn set_equipped(
        pool: &PgPool,
        user_id: &str,
        column: &'static str,
        value: &str,
    ) -> Result<bool, sqlx::Error> {
        let query =
            format!("UPDATE profiles SET {column} = $2, updated_at = NOW() WHERE user_id = $1");
        let result = sqlx::query(&query)
            .bind(user_id)
            .bind(value)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
