use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::folio::{Folio, FolioLineItem};
use crate::inventory::{InventoryAdjustment, InventoryDay, InventoryViolation};
use crate::reservation::{Reservation, ReservationStatus};
use crate::room::{Room, RoomLock, RoomStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Reservation {id} is {actual}, expected {expected}")]
    StaleReservation {
        id: Uuid,
        expected: ReservationStatus,
        actual: ReservationStatus,
    },

    #[error("Room {id} is {actual}, expected {expected}")]
    StaleRoom {
        id: Uuid,
        expected: RoomStatus,
        actual: RoomStatus,
    },

    #[error("Inventory for {day}: {violation}")]
    Inventory {
        day: NaiveDate,
        violation: InventoryViolation,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Room status change applied together with a reservation transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTransition {
    pub room_id: Uuid,
    pub expected: RoomStatus,
    pub status: RoomStatus,
}

/// Everything one lifecycle step writes, applied all-or-nothing.
///
/// `reservation` is the row as it must look afterwards. The write only lands if
/// the stored status still equals `expected_status`, every inventory adjustment
/// keeps its night's counters valid and, when present, the room is still in
/// `room.expected`.
#[derive(Debug, Clone)]
pub struct ReservationTransition {
    pub reservation: Reservation,
    pub expected_status: ReservationStatus,
    pub inventory: Vec<InventoryAdjustment>,
    pub room: Option<RoomTransition>,
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn get_reservation(&self, id: Uuid) -> StoreResult<Option<Reservation>>;

    /// Apply a lifecycle step atomically.
    async fn apply_transition(&self, transition: &ReservationTransition) -> StoreResult<()>;

    /// PENDING_PAYMENT reservations whose hold expired at or before `now`.
    async fn list_expired_holds(&self, now: DateTime<Utc>) -> StoreResult<Vec<Reservation>>;
}

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn get_room(&self, id: Uuid) -> StoreResult<Option<Room>>;

    /// Set a room's status. With `expected`, only succeeds if the room is still in that state.
    async fn update_room_status(
        &self,
        id: Uuid,
        expected: Option<RoomStatus>,
        status: RoomStatus,
    ) -> StoreResult<Room>;

    /// Fails with `Conflict` if the room is already locked for that day.
    async fn insert_room_lock(&self, lock: &RoomLock) -> StoreResult<()>;
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Days in `[from, to)`, ordered by day. Missing days are simply absent.
    async fn list_inventory(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<InventoryDay>>;
}

#[async_trait]
pub trait FolioRepository: Send + Sync {
    /// Folio with its line items, oldest first.
    async fn find_folio_by_reservation(&self, reservation_id: Uuid) -> StoreResult<Option<Folio>>;

    /// Append a line item and move the balance by its amount.
    async fn post_line_item(&self, item: &FolioLineItem) -> StoreResult<Folio>;
}

/// Everything the front desk needs from storage.
pub trait FrontDeskStore:
    ReservationRepository + RoomRepository + InventoryRepository + FolioRepository
{
}

impl<T> FrontDeskStore for T where
    T: ReservationRepository + RoomRepository + InventoryRepository + FolioRepository
{
}
