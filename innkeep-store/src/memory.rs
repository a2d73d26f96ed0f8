use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use innkeep_core::{
    Folio, FolioLineItem, FolioRepository, InventoryDay, InventoryRepository, Reservation,
    ReservationRepository, ReservationTransition, Room, RoomLock, RoomRepository, RoomStatus,
    StoreError, StoreResult,
};
use innkeep_ledger::{post_line_item, InventoryLedger};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Default)]
struct State {
    reservations: HashMap<Uuid, Reservation>,
    rooms: HashMap<Uuid, Room>,
    folios: HashMap<Uuid, Folio>,
    inventory: InventoryLedger,
    room_locks: HashMap<(Uuid, NaiveDate), RoomLock>,
}

/// Process-local store with the same transition guarantees as [`crate::PgStore`].
///
/// A single mutex covers every table, so a transition is validated in full
/// before anything is written. Used by tests and by local runs without a database.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    /// Seeding inserts never leave a table half written; a poisoned lock is recovered.
    fn seed_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_reservation(&self, reservation: Reservation) {
        self.seed_state().reservations.insert(reservation.id, reservation);
    }

    pub fn insert_room(&self, room: Room) {
        self.seed_state().rooms.insert(room.id, room);
    }

    pub fn insert_folio(&self, folio: Folio) {
        self.seed_state().folios.insert(folio.id, folio);
    }

    pub fn insert_inventory(&self, day: InventoryDay) {
        self.seed_state().inventory.insert(day);
    }

    pub fn room_locks(&self) -> Vec<RoomLock> {
        self.state()
            .map(|state| state.room_locks.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn get_reservation(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        Ok(self.state()?.reservations.get(&id).cloned())
    }

    async fn apply_transition(&self, transition: &ReservationTransition) -> StoreResult<()> {
        let mut state = self.state()?;
        let next = &transition.reservation;

        let current = state
            .reservations
            .get(&next.id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "reservation",
                id: next.id.to_string(),
            })?;
        if current.status != transition.expected_status {
            return Err(StoreError::StaleReservation {
                id: next.id,
                expected: transition.expected_status,
                actual: current.status,
            });
        }

        if let Some(room_change) = &transition.room {
            let room = state
                .rooms
                .get(&room_change.room_id)
                .ok_or_else(|| StoreError::NotFound {
                    entity: "room",
                    id: room_change.room_id.to_string(),
                })?;
            if room.status != room_change.expected {
                return Err(StoreError::StaleRoom {
                    id: room.id,
                    expected: room_change.expected,
                    actual: room.status,
                });
            }
        }

        // last check that can fail; it writes nothing when it does
        state
            .inventory
            .apply_all(next.hotel_id, next.room_type_id, &transition.inventory)
            .map_err(|(day, violation)| StoreError::Inventory { day, violation })?;

        if let Some(room_change) = &transition.room {
            if let Some(room) = state.rooms.get_mut(&room_change.room_id) {
                room.status = room_change.status;
                room.updated_at = next.updated_at;
            }
        }
        state.reservations.insert(next.id, next.clone());
        Ok(())
    }

    async fn list_expired_holds(&self, now: DateTime<Utc>) -> StoreResult<Vec<Reservation>> {
        Ok(self
            .state()?
            .reservations
            .values()
            .filter(|r| r.is_hold_expired(now))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn get_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
        Ok(self.state()?.rooms.get(&id).cloned())
    }

    async fn update_room_status(
        &self,
        id: Uuid,
        expected: Option<RoomStatus>,
        status: RoomStatus,
    ) -> StoreResult<Room> {
        let mut state = self.state()?;
        let room = state.rooms.get_mut(&id).ok_or_else(|| StoreError::NotFound {
            entity: "room",
            id: id.to_string(),
        })?;

        if let Some(expected) = expected {
            if room.status != expected {
                return Err(StoreError::StaleRoom { id, expected, actual: room.status });
            }
        }

        room.status = status;
        room.updated_at = Utc::now();
        Ok(room.clone())
    }

    async fn insert_room_lock(&self, lock: &RoomLock) -> StoreResult<()> {
        let mut state = self.state()?;
        let key = (lock.room_id, lock.day);
        if state.room_locks.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "room {} already locked for {}",
                lock.room_id, lock.day
            )));
        }
        state.room_locks.insert(key, lock.clone());
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for InMemoryStore {
    async fn list_inventory(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<InventoryDay>> {
        Ok(self.state()?.inventory.range(hotel_id, room_type_id, from, to))
    }
}

#[async_trait]
impl FolioRepository for InMemoryStore {
    async fn find_folio_by_reservation(&self, reservation_id: Uuid) -> StoreResult<Option<Folio>> {
        Ok(self
            .state()?
            .folios
            .values()
            .find(|f| f.reservation_id == reservation_id)
            .cloned())
    }

    async fn post_line_item(&self, item: &FolioLineItem) -> StoreResult<Folio> {
        let mut state = self.state()?;
        let folio = state.folios.get_mut(&item.folio_id).ok_or_else(|| StoreError::NotFound {
            entity: "folio",
            id: item.folio_id.to_string(),
        })?;

        post_line_item(folio, item.clone()).map_err(|e| StoreError::Conflict(e.to_string()))?;
        Ok(folio.clone())
    }
}
