//! Repositories: one unit struct per table group, each exposing static
//! async functions over a [`PgPool`](sqlx::PgPool).

mod mission_repo;
mod pokemon_repo;
mod profile_repo;
mod shop_repo;
mod team_repo;

pub use mission_repo::{ClaimOutcome, MissionRepo};
pub use pokemon_repo::PokemonRepo;
pub use profile_repo::ProfileRepo;
pub use shop_repo::{PurchaseOutcome, ShopRepo};
pub use team_repo::TeamRepo;
