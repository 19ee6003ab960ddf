//! Profile rows.

use dexquest_core::profile::Profile;
use dexquest_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub user_id: String,
    pub display_name: String,
    pub gold: i64,
    pub xp: i64,
    pub level: i32,
    pub equipped_avatar_frame: Option<String>,
    pub equipped_title: Option<String>,
    pub theme_colors: Option<String>,
    pub updated_at: Timestamp,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            user_id: row.user_id,
            display_name: row.display_name,
            gold: row.gold,
            xp: row.xp,
            level: row.level,
            equipped_avatar_frame: row.equipped_avatar_frame,
            equipped_title: row.equipped_title,
            theme_colors: row.theme_colors,
        }
    }
}
