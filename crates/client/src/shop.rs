//! Shop purchases and equipping owned items.

use std::sync::Arc;

use dexquest_core::profile::EquipCategory;
use dexquest_core::shop::{PurchaseReceipt, ShopItem};
use dexquest_core::types::DbId;
use dexquest_db::DataStore;
use dexquest_events::events::{InventoryEquipChanged, PurchaseMade};
use dexquest_events::EventBus;

use crate::error::ClientResult;
use crate::session::Session;

#[derive(Clone)]
pub struct ShopService {
    store: Arc<dyn DataStore>,
    bus: Arc<EventBus>,
    session: Session,
}

impl ShopService {
    pub fn new(store: Arc<dyn DataStore>, bus: Arc<EventBus>, session: Session) -> Self {
        Self {
            store,
            bus,
            session,
        }
    }

    pub async fn list_items(&self) -> ClientResult<Vec<ShopItem>> {
        Ok(self.store.list_shop_items().await?)
    }

    /// Buy an item.
    ///
    /// The store debits gold and records ownership atomically. On success
    /// the purchase, mission progress and (for paid items) gold events are
    /// published in that order.
    pub async fn purchase_item(&self, item_id: DbId) -> ClientResult<PurchaseReceipt> {
        let user_id = self.session.require_user()?;
        let receipt = self.store.purchase_item(user_id, item_id).await?;

        tracing::info!(
            user_id,
            item_id,
            price = receipt.item.price,
            remaining_gold = receipt.remaining_gold,
            "Item purchased"
        );
        self.bus.publish_purchase(
            PurchaseMade {
                item_id,
                category: receipt.item.category,
            },
            receipt.item.price,
        );
        Ok(receipt)
    }

    /// Equip an owned item and return the confirmation message.
    pub async fn equip_item(&self, category: EquipCategory, item_name: &str) -> ClientResult<String> {
        let user_id = self.session.require_user()?;
        let message = self
            .store
            .update_equipped_item(user_id, category, item_name)
            .await?;

        tracing::info!(user_id, category = category.as_str(), item = item_name, "Item equipped");
        self.bus.inventory().publish(InventoryEquipChanged {
            category,
            item_name: item_name.to_string(),
        });
        Ok(message)
    }
}
