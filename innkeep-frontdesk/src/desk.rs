use chrono::{DateTime, NaiveDate, Utc};
use innkeep_core::{
    Clock, EventPublisher, Folio, FrontDeskStore, InventoryAdjustment, InventoryDay,
    InventoryViolation, Reservation, ReservationStatus, ReservationTransition, Room, RoomLock,
    RoomStatus, RoomTransition, StoreError,
};
use innkeep_ledger::{room_charge, stay_nights};
use innkeep_shared::{FrontDeskEvent, Masked};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{FrontDeskError, FrontDeskResult};

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmPaymentOutcome {
    pub reservation: Reservation,
    /// Set when the folio could not be charged. The confirmation itself stands.
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckInOutcome {
    pub reservation: Reservation,
    pub room_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutOutcome {
    pub reservation: Reservation,
    pub final_balance: i64,
}

/// Moves reservations through their lifecycle.
///
/// Holds no state of its own between calls: every operation reads what it
/// needs, validates, and hands a single [`ReservationTransition`] to the store.
pub struct FrontDesk {
    store: Arc<dyn FrontDeskStore>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl FrontDesk {
    pub fn new(
        store: Arc<dyn FrontDeskStore>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, publisher, clock }
    }

    /// PENDING_PAYMENT → CONFIRMED
    ///
    /// Converts one hold into one reserved unit for every night of the stay,
    /// then charges the folio for the full stay. A folio failure is reported
    /// as a warning only.
    pub async fn confirm_payment(
        &self,
        reservation_id: Uuid,
        payment_method: Option<String>,
    ) -> FrontDeskResult<ConfirmPaymentOutcome> {
        let reservation = self.load_reservation(reservation_id).await?;
        ensure_transition(&reservation, ReservationStatus::Confirmed)?;

        let now = self.clock.now();
        let nights = stay_nights(reservation.check_in, reservation.check_out);

        let mut confirmed = reservation.clone();
        confirmed.status = ReservationStatus::Confirmed;
        confirmed.hold_expires_at = None;
        confirmed.metadata.confirmed_at = Some(now);
        confirmed.metadata.payment_method = payment_method.clone();
        confirmed.updated_at = now;

        let transition = ReservationTransition {
            reservation: confirmed.clone(),
            expected_status: ReservationStatus::PendingPayment,
            inventory: nights.iter().copied().map(InventoryAdjustment::convert_hold).collect(),
            room: None,
        };

        self.store.apply_transition(&transition).await.map_err(|e| match e {
            StoreError::Inventory { day, violation } => match violation {
                InventoryViolation::MissingDay | InventoryViolation::HoldUnderflow => {
                    FrontDeskError::HoldReleaseError { day, reason: violation.to_string() }
                }
                InventoryViolation::OverCapacity | InventoryViolation::ReservedUnderflow => {
                    FrontDeskError::ReservedIncrementError { day, reason: violation.to_string() }
                }
            },
            other => transition_error(reservation_id, other),
        })?;

        info!(
            reservation_id = %reservation_id,
            nights = nights.len(),
            payment_method = ?payment_method,
            "Reservation confirmed"
        );

        let warning = match self.charge_stay(&confirmed, now).await {
            Ok(folio) => {
                debug!(reservation_id = %reservation_id, balance = folio.balance, "Stay charged to folio");
                None
            }
            Err(reason) => {
                warn!(reservation_id = %reservation_id, "Payment confirmed but folio update failed: {}", reason);
                Some(format!("Folio update failed: {}", reason))
            }
        };

        self.publish(FrontDeskEvent::ReservationConfirmed {
            reservation_id,
            hotel_id: confirmed.hotel_id,
            payment_method,
            total_amount: confirmed.total_amount,
            timestamp: now.timestamp(),
        })
        .await;

        Ok(ConfirmPaymentOutcome { reservation: confirmed, warning })
    }

    /// CONFIRMED → CHECKED_IN, on the arrival day only.
    pub async fn check_in(
        &self,
        reservation_id: Uuid,
        room_id: Uuid,
        notes: Option<Masked<String>>,
    ) -> FrontDeskResult<CheckInOutcome> {
        let reservation = self.load_reservation(reservation_id).await?;
        ensure_transition(&reservation, ReservationStatus::CheckedIn)?;

        let now = self.clock.now();
        let today = self.clock.today();
        if reservation.check_in != today {
            return Err(FrontDeskError::InvalidCheckInDate {
                check_in: reservation.check_in,
                today,
            });
        }

        let room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or(FrontDeskError::RoomNotFound(room_id))?;

        if !room.matches(reservation.hotel_id, reservation.room_type_id) {
            return Err(FrontDeskError::RoomTypeMismatch(room_id));
        }
        if room.status != RoomStatus::Available {
            return Err(FrontDeskError::RoomNotAvailable { room_id, status: room.status });
        }

        let mut checked_in = reservation.clone();
        checked_in.status = ReservationStatus::CheckedIn;
        checked_in.room_id = Some(room_id);
        checked_in.metadata.checked_in_at = Some(now);
        checked_in.metadata.room_number = Some(room.number.clone());
        checked_in.metadata.check_in_notes = notes.clone().map(Masked::into_inner);
        checked_in.updated_at = now;

        let transition = ReservationTransition {
            reservation: checked_in.clone(),
            expected_status: ReservationStatus::Confirmed,
            inventory: Vec::new(),
            room: Some(RoomTransition {
                room_id,
                expected: RoomStatus::Available,
                status: RoomStatus::Occupied,
            }),
        };

        self.store.apply_transition(&transition).await.map_err(|e| match e {
            StoreError::StaleRoom { actual, .. } => {
                FrontDeskError::RoomNotAvailable { room_id, status: actual }
            }
            StoreError::NotFound { entity: "room", .. } => {
                FrontDeskError::UpdateRoomError(e.to_string())
            }
            other => transition_error(reservation_id, other),
        })?;

        info!(
            reservation_id = %reservation_id,
            room_number = %room.number,
            notes = ?notes,
            "Guest checked in"
        );

        let lock = RoomLock { room_id, day: today, reservation_id };
        if let Err(e) = self.store.insert_room_lock(&lock).await {
            warn!(reservation_id = %reservation_id, room_id = %room_id, "Failed to create room lock: {}", e);
        }

        self.publish(FrontDeskEvent::GuestCheckedIn {
            reservation_id,
            hotel_id: checked_in.hotel_id,
            room_id,
            room_number: room.number.clone(),
            timestamp: now.timestamp(),
        })
        .await;
        self.publish(room_changed(&room, RoomStatus::Occupied, now)).await;

        Ok(CheckInOutcome { reservation: checked_in, room_number: room.number })
    }

    /// CHECKED_IN → CHECKED_OUT, once the folio is settled.
    ///
    /// The room goes to MAINTENANCE for housekeeping; failing that is logged
    /// and does not undo the check-out.
    pub async fn check_out(
        &self,
        reservation_id: Uuid,
        notes: Option<Masked<String>>,
    ) -> FrontDeskResult<CheckOutOutcome> {
        let reservation = self.load_reservation(reservation_id).await?;
        ensure_transition(&reservation, ReservationStatus::CheckedOut)?;

        let folio = self
            .store
            .find_folio_by_reservation(reservation_id)
            .await?
            .ok_or(FrontDeskError::FolioNotFound(reservation_id))?;

        if folio.has_outstanding_balance() {
            return Err(FrontDeskError::UnpaidBalance { balance: folio.balance });
        }

        let now = self.clock.now();
        let mut checked_out = reservation.clone();
        checked_out.status = ReservationStatus::CheckedOut;
        checked_out.metadata.checked_out_at = Some(now);
        checked_out.metadata.check_out_notes = notes.clone().map(Masked::into_inner);
        checked_out.updated_at = now;

        let transition = ReservationTransition {
            reservation: checked_out.clone(),
            expected_status: ReservationStatus::CheckedIn,
            inventory: Vec::new(),
            room: None,
        };
        self.store
            .apply_transition(&transition)
            .await
            .map_err(|e| transition_error(reservation_id, e))?;

        info!(
            reservation_id = %reservation_id,
            final_balance = folio.balance,
            notes = ?notes,
            "Guest checked out"
        );

        if let Some(room_id) = checked_out.room_id {
            match self
                .store
                .update_room_status(room_id, None, RoomStatus::Maintenance)
                .await
            {
                Ok(room) => self.publish(room_changed(&room, RoomStatus::Maintenance, now)).await,
                Err(e) => warn!(
                    reservation_id = %reservation_id,
                    room_id = %room_id,
                    "Non-critical: failed to send room to housekeeping: {}", e
                ),
            }
        }

        self.publish(FrontDeskEvent::GuestCheckedOut {
            reservation_id,
            hotel_id: checked_out.hotel_id,
            room_id: checked_out.room_id,
            final_balance: folio.balance,
            timestamp: now.timestamp(),
        })
        .await;

        Ok(CheckOutOutcome { reservation: checked_out, final_balance: folio.balance })
    }

    /// PENDING_PAYMENT or CONFIRMED → CANCELLED, returning the nights to inventory.
    pub async fn cancel(
        &self,
        reservation_id: Uuid,
        reason: Option<Masked<String>>,
    ) -> FrontDeskResult<Reservation> {
        let reservation = self.load_reservation(reservation_id).await?;

        ensure_transition(&reservation, ReservationStatus::Cancelled)?;

        let release: fn(NaiveDate) -> InventoryAdjustment = match reservation.status {
            ReservationStatus::PendingPayment => InventoryAdjustment::release_hold,
            _ => InventoryAdjustment::release_reserved,
        };

        let now = self.clock.now();
        let mut cancelled = reservation.clone();
        cancelled.status = ReservationStatus::Cancelled;
        cancelled.hold_expires_at = None;
        cancelled.metadata.cancelled_at = Some(now);
        cancelled.metadata.cancellation_reason = reason.clone().map(Masked::into_inner);
        cancelled.updated_at = now;

        let transition = ReservationTransition {
            reservation: cancelled.clone(),
            expected_status: reservation.status,
            inventory: stay_nights(reservation.check_in, reservation.check_out)
                .into_iter()
                .map(release)
                .collect(),
            room: None,
        };

        self.store.apply_transition(&transition).await.map_err(|e| match e {
            StoreError::Inventory { day, violation } => FrontDeskError::InventoryReleaseError {
                day,
                reason: violation.to_string(),
            },
            other => transition_error(reservation_id, other),
        })?;

        info!(reservation_id = %reservation_id, previous = %reservation.status, reason = ?reason, "Reservation cancelled");

        self.publish(FrontDeskEvent::ReservationCancelled {
            reservation_id,
            hotel_id: cancelled.hotel_id,
            timestamp: now.timestamp(),
        })
        .await;

        Ok(cancelled)
    }

    /// Expire every PENDING_PAYMENT reservation whose hold has lapsed.
    ///
    /// Each reservation is expired on its own; one failure does not stop the
    /// sweep. Returns the ids that were expired.
    pub async fn expire_stale_holds(&self) -> FrontDeskResult<Vec<Uuid>> {
        let now = self.clock.now();
        let candidates = self.store.list_expired_holds(now).await?;
        let mut expired = Vec::with_capacity(candidates.len());

        for reservation in candidates {
            if !reservation.is_hold_expired(now)
                || !reservation.status.can_transition_to(ReservationStatus::Expired)
            {
                continue;
            }

            let mut next = reservation.clone();
            next.status = ReservationStatus::Expired;
            next.metadata.expired_at = Some(now);
            next.updated_at = now;

            let transition = ReservationTransition {
                reservation: next,
                expected_status: ReservationStatus::PendingPayment,
                inventory: stay_nights(reservation.check_in, reservation.check_out)
                    .into_iter()
                    .map(InventoryAdjustment::release_hold)
                    .collect(),
                room: None,
            };

            match self.store.apply_transition(&transition).await {
                Ok(()) => {
                    info!(reservation_id = %reservation.id, "Hold expired");
                    self.publish(FrontDeskEvent::ReservationExpired {
                        reservation_id: reservation.id,
                        hotel_id: reservation.hotel_id,
                        timestamp: now.timestamp(),
                    })
                    .await;
                    expired.push(reservation.id);
                }
                Err(StoreError::StaleReservation { actual, .. }) => {
                    debug!(reservation_id = %reservation.id, status = %actual, "Skipping expiry, reservation moved on");
                }
                Err(e) => {
                    warn!(reservation_id = %reservation.id, "Failed to expire hold: {}", e);
                }
            }
        }

        Ok(expired)
    }

    /// Housekeeping moves a vacant room between AVAILABLE, MAINTENANCE and OUT_OF_ORDER.
    pub async fn update_housekeeping(&self, room_id: Uuid, status: RoomStatus) -> FrontDeskResult<Room> {
        if status == RoomStatus::Occupied {
            return Err(FrontDeskError::InvalidRequest(
                "rooms become OCCUPIED only through check-in".to_string(),
            ));
        }

        let room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or(FrontDeskError::RoomNotFound(room_id))?;

        if room.status == RoomStatus::Occupied {
            return Err(FrontDeskError::RoomOccupied(room_id));
        }

        let updated = self
            .store
            .update_room_status(room_id, Some(room.status), status)
            .await
            .map_err(|e| match e {
                StoreError::StaleRoom { actual: RoomStatus::Occupied, .. } => {
                    FrontDeskError::RoomOccupied(room_id)
                }
                other => FrontDeskError::UpdateRoomError(other.to_string()),
            })?;

        info!(room_id = %room_id, from = %room.status, to = %status, "Housekeeping status updated");
        self.publish(room_changed(&updated, status, self.clock.now())).await;

        Ok(updated)
    }

    pub async fn reservation(&self, reservation_id: Uuid) -> FrontDeskResult<Reservation> {
        self.load_reservation(reservation_id).await
    }

    pub async fn folio(&self, reservation_id: Uuid) -> FrontDeskResult<Folio> {
        self.store
            .find_folio_by_reservation(reservation_id)
            .await?
            .ok_or(FrontDeskError::FolioNotFound(reservation_id))
    }

    pub async fn room(&self, room_id: Uuid) -> FrontDeskResult<Room> {
        self.store
            .get_room(room_id)
            .await?
            .ok_or(FrontDeskError::RoomNotFound(room_id))
    }

    /// Inventory nights in `[from, to)`.
    pub async fn inventory(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> FrontDeskResult<Vec<InventoryDay>> {
        if from > to {
            return Err(FrontDeskError::InvalidRequest(format!(
                "`from` ({}) is after `to` ({})",
                from, to
            )));
        }
        Ok(self.store.list_inventory(hotel_id, room_type_id, from, to).await?)
    }

    async fn load_reservation(&self, reservation_id: Uuid) -> FrontDeskResult<Reservation> {
        self.store
            .get_reservation(reservation_id)
            .await?
            .ok_or(FrontDeskError::ReservationNotFound(reservation_id))
    }

    async fn charge_stay(&self, reservation: &Reservation, now: DateTime<Utc>) -> Result<Folio, String> {
        let folio = self
            .store
            .find_folio_by_reservation(reservation.id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "no folio for reservation".to_string())?;

        self.store
            .post_line_item(&room_charge(folio.id, reservation, now))
            .await
            .map_err(|e| e.to_string())
    }

    async fn publish(&self, event: FrontDeskEvent) {
        if let Err(e) = self.publisher.publish(&event).await {
            warn!(event = event.kind(), "Failed to publish front desk event: {}", e);
        }
    }
}

/// Rejects any move the lifecycle table does not allow.
fn ensure_transition(reservation: &Reservation, next: ReservationStatus) -> FrontDeskResult<()> {
    if reservation.status.can_transition_to(next) {
        return Ok(());
    }

    let expected = ReservationStatus::ALL
        .iter()
        .filter(|status| status.can_transition_to(next))
        .map(|status| status.as_str())
        .collect::<Vec<_>>()
        .join(" or ");

    Err(FrontDeskError::InvalidStatus {
        actual: reservation.status,
        expected,
    })
}

fn transition_error(reservation_id: Uuid, err: StoreError) -> FrontDeskError {
    match err {
        StoreError::StaleReservation { actual, expected, .. } => FrontDeskError::InvalidStatus {
            actual,
            expected: expected.to_string(),
        },
        StoreError::NotFound { entity: "reservation", .. } => {
            FrontDeskError::ReservationNotFound(reservation_id)
        }
        other => FrontDeskError::UpdateReservationError(other.to_string()),
    }
}

fn room_changed(room: &Room, status: RoomStatus, now: DateTime<Utc>) -> FrontDeskEvent {
    FrontDeskEvent::RoomStatusChanged {
        room_id: room.id,
        hotel_id: room.hotel_id,
        status: status.to_string(),
        timestamp: now.timestamp(),
    }
}
