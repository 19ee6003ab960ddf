/// Catalog identifiers (Pokémon, missions, shop items, teams) are
/// PostgreSQL BIGINT/BIGSERIAL values.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
