/**
 * ItineraryBook — spec §4.3.
 *
 * Re-indexing algorithm matches
 * `original_source/.../itinerary_manager.py`: items are always stored
 * chronologically (`scheduled_time`, ties broken by `added_at`), and
 * `order` is just that sort's 0-based position, recomputed after every
 * structural change. `Reorder` is the one operation that's allowed to
 * override the natural order, and it survives until the next add/remove.
 */
use std::sync::Arc;

use uuid::Uuid;

use super::clock::Clock;
use super::error::{CoreError, CoreResult};
use super::ids::IdGenerator;
use super::model::ItineraryItem;
use super::store::Store;
use chrono::{DateTime, Utc};

pub struct ItineraryBook {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl ItineraryBook {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, clock, ids }
    }

    pub async fn get_itinerary(&self, session_id: Uuid) -> CoreResult<Vec<ItineraryItem>> {
        let mut items = self
            .store
            .list_itinerary(session_id)
            .await
            .map_err(log_storage_failure("list_itinerary"))?;
        items.sort_by_key(|i| i.order);
        Ok(items)
    }

    pub async fn add_to_itinerary(
        &self,
        session_id: Uuid,
        venue_id: Uuid,
        scheduled_time: DateTime<Utc>,
        added_by: String,
    ) -> CoreResult<Vec<ItineraryItem>> {
        let mut items = self
            .store
            .list_itinerary(session_id)
            .await
            .map_err(log_storage_failure("list_itinerary"))?;

        items.push(ItineraryItem {
            id: self.ids.next_id(),
            session_id,
            venue_id,
            scheduled_time,
            added_at: self.clock.now(),
            added_by,
            order: 0,
        });

        reindex_chronologically(&mut items);
        self.persist(session_id, items).await
    }

    pub async fn remove_from_itinerary(
        &self,
        session_id: Uuid,
        item_id: Uuid,
    ) -> CoreResult<Vec<ItineraryItem>> {
        let mut items = self
            .store
            .list_itinerary(session_id)
            .await
            .map_err(log_storage_failure("list_itinerary"))?;

        let before = items.len();
        items.retain(|i| i.id != item_id);
        if items.len() == before {
            return Err(CoreError::ItemNotFound(item_id.to_string()));
        }

        reindex_chronologically(&mut items);
        self.persist(session_id, items).await
    }

    /// Applies a caller-supplied order to the given items, identified by id.
    /// Every existing item must appear exactly once in `ordered_item_ids`.
    pub async fn reorder(
        &self,
        session_id: Uuid,
        ordered_item_ids: Vec<Uuid>,
    ) -> CoreResult<Vec<ItineraryItem>> {
        let items = self
            .store
            .list_itinerary(session_id)
            .await
            .map_err(log_storage_failure("list_itinerary"))?;

        if ordered_item_ids.len() != items.len() {
            return Err(CoreError::validation(
                "reorder list must name every itinerary item exactly once",
            ));
        }

        let mut by_id: std::collections::HashMap<Uuid, ItineraryItem> =
            items.into_iter().map(|i| (i.id, i)).collect();

        let mut reordered = Vec::with_capacity(ordered_item_ids.len());
        for (position, id) in ordered_item_ids.into_iter().enumerate() {
            let mut item = by_id
                .remove(&id)
                .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;
            item.order = position as u32;
            reordered.push(item);
        }

        self.persist(session_id, reordered).await
    }

    async fn persist(
        &self,
        session_id: Uuid,
        items: Vec<ItineraryItem>,
    ) -> CoreResult<Vec<ItineraryItem>> {
        self.store
            .replace_itinerary(session_id, items.clone())
            .await
            .map_err(log_storage_failure("replace_itinerary"))?;
        Ok(items)
    }
}

/// Sorts by `(scheduled_time, added_at)` ascending and reassigns `order` to
/// the resulting 0-based position. Mirrors the original's re-sort-on-write
/// approach rather than maintaining order incrementally.
fn reindex_chronologically(items: &mut [ItineraryItem]) {
    items.sort_by_key(|i| (i.scheduled_time, i.added_at));
    for (position, item) in items.iter_mut().enumerate() {
        item.order = position as u32;
    }
}

fn log_storage_failure(op: &'static str) -> impl Fn(anyhow::Error) -> CoreError + '_ {
    move |err| {
        tracing::error!(operation = op, error = %err, "store operation failed");
        CoreError::StorageFailure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(order: u32, scheduled_offset: i64, added_offset: i64) -> ItineraryItem {
        let base = Utc::now();
        ItineraryItem {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            scheduled_time: base + Duration::hours(scheduled_offset),
            added_at: base + Duration::seconds(added_offset),
            added_by: "p1".to_string(),
            order,
        }
    }

    #[test]
    fn reindex_orders_by_scheduled_time_then_added_at() {
        let mut items = vec![item(9, 3, 0), item(9, 1, 0), item(9, 2, 5), item(9, 2, 1)];
        reindex_chronologically(&mut items);
        let orders: Vec<u32> = items.iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
        assert_eq!(items[0].scheduled_time, items[0].scheduled_time.min(items[1].scheduled_time));
    }
}
