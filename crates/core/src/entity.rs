//! Catalog entities (Pokémon) and their user-specific flags.
//!
//! Entities are immutable value records. Flag changes produce a new record
//! via [`Pokemon::with_caught`] / [`Pokemon::with_favorite`]; callers replace
//! the whole record by id rather than mutating fields in place.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum number of type tags an entity carries.
pub const MIN_TYPES: usize = 1;

/// Maximum number of type tags an entity carries.
pub const MAX_TYPES: usize = 2;

/// Inclusive national-dex id ranges per generation, indexed by generation - 1.
const GENERATION_RANGES: &[(DbId, DbId)] = &[
    (1, 151),
    (152, 251),
    (252, 386),
    (387, 493),
    (494, 649),
    (650, 721),
    (722, 809),
    (810, 905),
    (906, 1025),
];

// ---------------------------------------------------------------------------
// Pokemon
// ---------------------------------------------------------------------------

/// A catalog entity with the current user's collected/favorite flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pokemon {
    pub id: DbId,
    pub name: String,
    /// Ordered type tags, e.g. `["grass", "poison"]`.
    pub types: Vec<String>,
    pub is_caught: bool,
    pub is_favorite: bool,
}

impl Pokemon {
    /// Build a validated entity with both user flags cleared.
    pub fn new(id: DbId, name: impl Into<String>, types: Vec<String>) -> Result<Self, CoreError> {
        if id <= 0 {
            return Err(CoreError::Validation(format!(
                "Pokemon id must be positive, got {id}"
            )));
        }
        if !(MIN_TYPES..=MAX_TYPES).contains(&types.len()) {
            return Err(CoreError::Validation(format!(
                "Pokemon {id} must have {MIN_TYPES}-{MAX_TYPES} types, got {}",
                types.len()
            )));
        }
        Ok(Self {
            id,
            name: name.into(),
            types,
            is_caught: false,
            is_favorite: false,
        })
    }

    /// Copy of this record with `is_caught` replaced.
    pub fn with_caught(&self, is_caught: bool) -> Self {
        Self {
            is_caught,
            ..self.clone()
        }
    }

    /// Copy of this record with `is_favorite` replaced.
    pub fn with_favorite(&self, is_favorite: bool) -> Self {
        Self {
            is_favorite,
            ..self.clone()
        }
    }

    /// Whether the entity carries the given type tag (case-insensitive).
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// The generation this entity belongs to, if its id is in a known range.
    pub fn generation(&self) -> Option<u8> {
        generation_of(self.id)
    }
}

// ---------------------------------------------------------------------------
// Generations
// ---------------------------------------------------------------------------

/// Inclusive id range for a generation (1-based).
pub fn generation_range(generation: u8) -> Option<(DbId, DbId)> {
    let index = usize::from(generation).checked_sub(1)?;
    GENERATION_RANGES.get(index).copied()
}

/// The generation containing `id`, if any.
pub fn generation_of(id: DbId) -> Option<u8> {
    GENERATION_RANGES
        .iter()
        .position(|&(lo, hi)| (lo..=hi).contains(&id))
        .map(|index| index as u8 + 1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
