//! Repository for the `pokemon` and `user_pokemon` tables.

use dexquest_core::types::DbId;
use sqlx::PgPool;

use crate::models::pokemon::{PokemonRow, UserPokemonRow};

/// Column list for `pokemon` queries.
const POKEMON_COLUMNS: &str = "id, name, types";

/// Provides read/write operations for the entity catalog and user flags.
pub struct PokemonRepo;

impl PokemonRepo {
    /// List the catalog ordered by id, up to `limit` rows.
    pub async fn list(pool: &PgPool, limit: i64) -> Result<Vec<PokemonRow>, sqlx::Error> {
        let query = format!("SELECT {POKEMON_COLUMNS} FROM pokemon ORDER BY id LIMIT $1");
        sqlx::query_as::<_, PokemonRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every flag row for a user.
    pub async fn list_user_flags(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<UserPokemonRow>, sqlx::Error> {
        sqlx::query_as::<_, UserPokemonRow>(
            "SELECT pokemon_id, is_caught, is_favorite FROM user_pokemon WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Caught entities for a user, with their types.
    pub async fn list_caught(pool: &PgPool, user_id: &str) -> Result<Vec<PokemonRow>, sqlx::Error> {
        sqlx::query_as::<_, PokemonRow>(
            "SELECT p.id, p.name, p.types \
             FROM pokemon p \
             JOIN user_pokemon up ON up.pokemon_id = p.id \
             WHERE up.user_id = $1 AND up.is_caught \
             ORDER BY p.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_favorites(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_pokemon WHERE user_id = $1 AND is_favorite",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Upsert the caught flag. Returns `false` if the entity does not exist.
    pub async fn set_caught(
        pool: &PgPool,
        user_id: &str,
        pokemon_id: DbId,
        caught: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_pokemon (user_id, pokemon_id, is_caught) \
             SELECT $1, id, $3 FROM pokemon WHERE id = $2 \
             ON CONFLICT (user_id, pokemon_id) \
             DO UPDATE SET is_caught = EXCLUDED.is_caught, updated_at = NOW()",
        )
        .bind(user_id)
        .bind(pokemon_id)
        .bind(caught)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Upsert the favorite flag. Returns `false` if the entity does not exist.
    pub async fn set_favorite(
        pool: &PgPool,
        user_id: &str,
        pokemon_id: DbId,
        favorite: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_pokemon (user_id, pokemon_id, is_favorite) \
             SELECT $1, id, $3 FROM pokemon WHERE id = $2 \
             ON CONFLICT (user_id, pokemon_id) \
             DO UPDATE SET is_favorite = EXCLUDED.is_favorite, updated_at = NOW()",
        )
        .bind(user_id)
        .bind(pokemon_id)
        .bind(favorite)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
