use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;
use veranda_core::booking::BookingDraft;

/// Transient storage for the single in-flight booking draft.
///
/// One named slot, last write wins. Losing the slot (process restart,
/// tab close in a browser host) is acceptable: callers treat an empty
/// slot as "start the booking again", never as an error.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save(&self, draft: &BookingDraft) -> Result<(), DraftStoreError>;

    /// Returns `None` for an absent or malformed slot. A draft that no
    /// longer deserializes (schema drift) is discarded, not surfaced.
    async fn load(&self) -> Option<BookingDraft>;

    async fn clear(&self);
}

#[derive(Debug, thiserror::Error)]
pub enum DraftStoreError {
    #[error("Failed to serialize booking draft: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// In-memory slot holding the JSON-serialized draft, the engine's
/// equivalent of the browser's session storage key.
#[derive(Default)]
pub struct SessionDraftStore {
    slot: RwLock<Option<String>>,
}

impl SessionDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for SessionDraftStore {
    async fn save(&self, draft: &BookingDraft) -> Result<(), DraftStoreError> {
        let json = serde_json::to_string(draft)?;
        *self.slot.write().await = Some(json);
        Ok(())
    }

    async fn load(&self) -> Option<BookingDraft> {
        let guard = self.slot.read().await;
        let raw = guard.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(draft) => Some(draft),
            Err(err) => {
                warn!("Discarding malformed booking draft: {}", err);
                None
            }
        }
    }

    async fn clear(&self) {
        *self.slot.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use veranda_core::booking::{MealPlan, Occupancy, RoomFacilities, RoomSnapshot, Stay};
    use veranda_core::pricing::{quote, FeeSchedule};

    fn sample_draft() -> BookingDraft {
        let stay = Stay {
            check_in: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
        };
        let occupancy = Occupancy {
            adults: 1,
            children: 0,
            infants: 0,
            rooms: 1,
        };
        let fees = FeeSchedule {
            cleaning_fee: 100,
            service_fee: 50,
            tax_rate_percent: 18.0,
        };
        let price = quote(2000, stay.check_in, stay.check_out, 1, &fees).unwrap();
        let room = RoomSnapshot {
            room_type: "Deluxe Suite".to_string(),
            facilities: RoomFacilities::default(),
            meal_plan: MealPlan {
                breakfast: true,
                lunch: false,
                dinner: false,
            },
            image_refs: vec![],
        };
        BookingDraft::new("room-42".to_string(), room, stay, occupancy, price).unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_preserves_draft() {
        let store = SessionDraftStore::new();
        let draft = sample_draft();

        store.save(&draft).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, draft);
        // The breakdown the checkout page sees is the stored one, not
        // a recomputation
        assert_eq!(loaded.price.subtotal, 4000);
        assert_eq!(loaded.price.taxes, 747);
        assert_eq!(loaded.price.total_amount, 4897);
    }

    #[tokio::test]
    async fn test_empty_slot_loads_none() {
        let store = SessionDraftStore::new();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_slot_loads_none() {
        let store = SessionDraftStore::new();
        *store.slot.write().await = Some("{not json".to_string());
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_draft() {
        let store = SessionDraftStore::new();
        let first = sample_draft();
        let mut second = sample_draft();
        second.room_id = "room-7".to_string();

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        assert_eq!(store.load().await.unwrap().room_id, "room-7");
    }

    #[tokio::test]
    async fn test_clear_empties_slot() {
        let store = SessionDraftStore::new();
        store.save(&sample_draft()).await.unwrap();
        store.clear().await;
        assert!(store.load().await.is_none());
    }
}
