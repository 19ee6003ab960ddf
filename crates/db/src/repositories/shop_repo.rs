//! Repository for the `shop_items` and `user_inventory` tables.

use dexquest_core::types::DbId;
use sqlx::PgPool;

use crate::models::shop::ShopItemRow;

/// Column list for `shop_items` queries.
const SHOP_ITEM_COLUMNS: &str = "id, name, category, price, color_spec";

/// Result of a conditional purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased { remaining_gold: i64 },
    AlreadyOwned,
    InsufficientGold { available: i64 },
}

/// Provides read/write operations for the shop and user inventory.
pub struct ShopRepo;

impl ShopRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<ShopItemRow>, sqlx::Error> {
        let query = format!("SELECT {SHOP_ITEM_COLUMNS} FROM shop_items ORDER BY category, price, id");
        sqlx::query_as::<_, ShopItemRow>(&query).fetch_all(pool).await
    }

    pub async fn find(pool: &PgPool, item_id: DbId) -> Result<Option<ShopItemRow>, sqlx::Error> {
        let query = format!("SELECT {SHOP_ITEM_COLUMNS} FROM shop_items WHERE id = $1");
        sqlx::query_as::<_, ShopItemRow>(&query)
            .bind(item_id)
            .fetch_optional(pool)
            .await
    }

    /// An owned item of `category` named `name`, if the user owns one.
    pub async fn find_owned_by_name(
        pool: &PgPool,
        user_id: &str,
        category: &str,
        name: &str,
    ) -> Result<Option<ShopItemRow>, sqlx::Error> {
        sqlx::query_as::<_, ShopItemRow>(
            "SELECT s.id, s.name, s.category, s.price, s.color_spec \
             FROM shop_items s \
             JOIN user_inventory i ON i.item_id = s.id \
             WHERE i.user_id = $1 AND s.category = $2 AND s.name = $3",
        )
        .bind(user_id)
        .bind(category)
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    pub async fn count_purchases(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_inventory WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Add the item to the inventory and debit `price` in one transaction.
    ///
    /// The debit only succeeds while `gold >= price`; the inventory insert
    /// only succeeds if the item is not owned yet. Either failure rolls the
    /// whole purchase back.
    pub async fn purchase(
        pool: &PgPool,
        user_id: &str,
        item_id: DbId,
        price: i64,
    ) -> Result<PurchaseOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO user_inventory (user_id, item_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, item_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(PurchaseOutcome::AlreadyOwned);
        }

        let remaining: Option<i64> = sqlx::query_scalar(
            "UPDATE profiles SET gold = gold - $2, updated_at = NOW() \
             WHERE user_id = $1 AND gold >= $2 \
             RETURNING gold",
        )
        .bind(user_id)
        .bind(price)
        .fetch_optional(&mut *tx)
        .await?;

        match remaining {
            Some(remaining_gold) => {
                tx.commit().await?;
                Ok(PurchaseOutcome::Purchased { remaining_gold })
            }
            None => {
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT gold FROM profiles WHERE user_id = $1")
                        .bind(user_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                tx.rollback().await?;
                Ok(PurchaseOutcome::InsufficientGold {
                    available: available.unwrap_or(0),
                })
            }
        }
    }
}
