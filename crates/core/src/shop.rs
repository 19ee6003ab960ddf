//! Shop items, purchase receipts, and teams.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::profile::EquipCategory;
use crate::types::DbId;

/// Maximum number of members in a team.
pub const MAX_TEAM_SIZE: usize = 6;

/// Maximum length of a team name.
pub const MAX_TEAM_NAME_LENGTH: usize = 40;

/// A purchasable cosmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    pub id: DbId,
    pub name: String,
    pub category: EquipCategory,
    pub price: i64,
    /// Color spec written to the profile when a theme item is equipped.
    pub color_spec: Option<String>,
}

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub item: ShopItem,
    pub remaining_gold: i64,
}

/// A named group of caught entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: DbId,
    pub name: String,
    pub member_ids: Vec<DbId>,
}

/// Validate a team before it is sent to the store.
pub fn validate_team(name: &str, member_ids: &[DbId]) -> Result<(), CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Team name must not be empty".into()));
    }
    if name.chars().count() > MAX_TEAM_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Team name must be at most {MAX_TEAM_NAME_LENGTH} characters"
        )));
    }
    if member_ids.is_empty() || member_ids.len() > MAX_TEAM_SIZE {
        return Err(CoreError::Validation(format!(
            "A team needs 1-{MAX_TEAM_SIZE} members, got {}",
            member_ids.len()
        )));
    }
    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = member_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(CoreError::Validation(format!(
            "Pokemon {dup} appears twice in the team"
        )));
    }
    Ok(())
}
