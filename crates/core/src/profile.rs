//! User profile record and equip slots.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const EQUIP_THEME: &str = "theme";
pub const EQUIP_AVATAR_FRAME: &str = "avatar_frame";
pub const EQUIP_TITLE: &str = "title";

/// All valid equip category strings.
pub const VALID_EQUIP_CATEGORIES: &[&str] = &[EQUIP_THEME, EQUIP_AVATAR_FRAME, EQUIP_TITLE];

/// XP needed per level; level 1 starts at 0 XP.
pub const XP_PER_LEVEL: i64 = 1000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Profile slot an owned item can be equipped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipCategory {
    Theme,
    AvatarFrame,
    Title,
}

impl EquipCategory {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            EQUIP_THEME => Ok(Self::Theme),
            EQUIP_AVATAR_FRAME => Ok(Self::AvatarFrame),
            EQUIP_TITLE => Ok(Self::Title),
            _ => Err(format!(
                "Invalid equip category '{s}'. Must be one of: {}",
                VALID_EQUIP_CATEGORIES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Theme => EQUIP_THEME,
            Self::AvatarFrame => EQUIP_AVATAR_FRAME,
            Self::Title => EQUIP_TITLE,
        }
    }

    /// Human-readable slot name used in equip confirmations.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::AvatarFrame => "avatar frame",
            Self::Title => "title",
        }
    }
}

/// The signed-in user's profile as stored remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    pub gold: i64,
    pub xp: i64,
    pub level: i32,
    pub equipped_avatar_frame: Option<String>,
    pub equipped_title: Option<String>,
    /// Raw color spec; see [`crate::theme::parse_colors`].
    pub theme_colors: Option<String>,
}

impl Profile {
    /// Name of the item equipped in `category`, if any.
    pub fn equipped(&self, category: EquipCategory) -> Option<&str> {
        match category {
            EquipCategory::Theme => self.theme_colors.as_deref(),
            EquipCategory::AvatarFrame => self.equipped_avatar_frame.as_deref(),
            EquipCategory::Title => self.equipped_title.as_deref(),
        }
    }

    /// Copy of this profile with `delta` gold applied, floored at zero.
    pub fn with_gold_delta(&self, delta: i64) -> Self {
        Self {
            gold: self.gold.saturating_add(delta).max(0),
            ..self.clone()
        }
    }

    /// Copy of this profile with XP added and the level recomputed.
    pub fn with_xp_gained(&self, xp: i64) -> Self {
        let xp = self.xp.saturating_add(xp).max(0);
        Self {
            xp,
            level: level_for_xp(xp),
            ..self.clone()
        }
    }
}

/// Level reached with `xp` total experience (level 1 at zero).
pub fn level_for_xp(xp: i64) -> i32 {
    i32::try_from(xp.max(0) / XP_PER_LEVEL)
        .unwrap_or(i32::MAX - 1)
        .saturating_add(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gold_delta_never_goes_negative() {
        let profile = Profile {
            gold: 100,
            ..Default::default()
        };
        assert_eq!(profile.with_gold_delta(-30).gold, 70);
        assert_eq!(profile.with_gold_delta(-300).gold, 0);
    }

    #[test]
    fn xp_gain_recomputes_level() {
        let profile = Profile {
            xp: 950,
            level: 1,
            ..Default::default()
        };
        let leveled = profile.with_xp_gained(100);
        assert_eq!(leveled.xp, 1050);
        assert_eq!(leveled.level, 2);
    }

    #[test]
    fn extreme_values_saturate() {
        let rich = Profile {
            gold: i64::MAX - 5,
            xp: i64::MAX - 5,
            ..Default::default()
        };
        assert_eq!(rich.with_gold_delta(100).gold, i64::MAX);
        assert_eq!(rich.with_gold_delta(i64::MIN).gold, 0);

        let maxed = rich.with_xp_gained(100);
        assert_eq!(maxed.xp, i64::MAX);
        assert_eq!(maxed.level, i32::MAX);
        assert_eq!(level_for_xp(-50), 1);
    }

    #[test]
    fn equip_category_strings() {
        for s in VALID_EQUIP_CATEGORIES {
            assert_eq!(EquipCategory::from_str_value(s).unwrap().as_str(), *s);
        }
        assert!(EquipCategory::from_str_value("hat").is_err());
    }
}
