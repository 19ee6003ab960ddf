//! Entity catalog and per-user flag rows.

use dexquest_core::entity::Pokemon;
use dexquest_core::types::DbId;
use sqlx::FromRow;

use crate::error::StoreError;

/// A row from the `pokemon` table.
#[derive(Debug, Clone, FromRow)]
pub struct PokemonRow {
    pub id: DbId,
    pub name: String,
    pub types: Vec<String>,
}

impl TryFrom<PokemonRow> for Pokemon {
    type Error = StoreError;

    fn try_from(row: PokemonRow) -> Result<Self, Self::Error> {
        Pokemon::new(row.id, row.name, row.types).map_err(|e| StoreError::InvalidData(e.to_string()))
    }
}

/// A row from the `user_pokemon` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserPokemonRow {
    pub pokemon_id: DbId,
    pub is_caught: bool,
    pub is_favorite: bool,
}
