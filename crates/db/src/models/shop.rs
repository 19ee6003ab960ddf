//! Shop item and team rows.

use dexquest_core::profile::EquipCategory;
use dexquest_core::shop::{ShopItem, Team};
use dexquest_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use crate::error::StoreError;

/// A row from the `shop_items` table.
#[derive(Debug, Clone, FromRow)]
pub struct ShopItemRow {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub color_spec: Option<String>,
}

impl TryFrom<ShopItemRow> for ShopItem {
    type Error = StoreError;

    fn try_from(row: ShopItemRow) -> Result<Self, Self::Error> {
        let category = EquipCategory::from_str_value(&row.category).map_err(StoreError::InvalidData)?;
        Ok(ShopItem {
            id: row.id,
            name: row.name,
            category,
            price: row.price,
            color_spec: row.color_spec,
        })
    }
}

/// A row from the `teams` table.
#[derive(Debug, Clone, FromRow)]
pub struct TeamRow {
    pub id: DbId,
    pub name: String,
    pub member_ids: Vec<DbId>,
    pub created_at: Timestamp,
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Team {
            id: row.id,
            name: row.name,
            member_ids: row.member_ids,
        }
    }
}
