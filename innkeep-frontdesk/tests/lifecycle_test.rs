use chrono::{Duration, NaiveDate};
use innkeep_core::{
    Clock, FixedClock, Folio, FolioLineItem, FolioRepository, InventoryDay, InventoryRepository,
    LineItemKind, RecordingPublisher, Reservation, ReservationRepository, ReservationStatus, Room,
    RoomRepository, RoomStatus,
};
use innkeep_frontdesk::{FrontDesk, FrontDeskError};
use innkeep_shared::{FrontDeskEvent, Masked};
use innkeep_store::InMemoryStore;
use std::sync::Arc;
use uuid::Uuid;

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
}

struct Hotel {
    store: Arc<InMemoryStore>,
    events: Arc<RecordingPublisher>,
    desk: FrontDesk,
    hotel_id: Uuid,
    room_type_id: Uuid,
}

impl Hotel {
    /// Four rooms of one type, open for 2024-01-01..2024-01-31, desk clock on `today`.
    fn open(today: NaiveDate) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let events = Arc::new(RecordingPublisher::new());
        let hotel_id = Uuid::new_v4();
        let room_type_id = Uuid::new_v4();

        for n in 1..=31 {
            store.insert_inventory(InventoryDay::new(hotel_id, room_type_id, day(n), 4));
        }

        let desk = FrontDesk::new(store.clone(), events.clone(), Arc::new(FixedClock::on(today)));
        Self { store, events, desk, hotel_id, room_type_id }
    }

    /// A pending booking for `[check_in, check_out)` with its holds counted and an empty folio.
    fn book(&self, check_in: NaiveDate, check_out: NaiveDate) -> Reservation {
        let reservation = Reservation::pending(
            self.hotel_id,
            self.room_type_id,
            check_in,
            check_out,
            45000,
            "USD",
            None,
        );
        let mut night = check_in;
        while night < check_out {
            self.store.insert_inventory(InventoryDay {
                holds: 1,
                ..InventoryDay::new(self.hotel_id, self.room_type_id, night, 4)
            });
            night = night.succ_opt().unwrap();
        }
        self.store.insert_reservation(reservation.clone());
        self.store.insert_folio(Folio::open(reservation.id, "USD"));
        reservation
    }

    fn room(&self, number: &str) -> Room {
        let room = Room::new(self.hotel_id, self.room_type_id, number);
        self.store.insert_room(room.clone());
        room
    }

    async fn nights(&self, from: NaiveDate, to: NaiveDate) -> Vec<InventoryDay> {
        self.store.list_inventory(self.hotel_id, self.room_type_id, from, to).await.unwrap()
    }

    async fn status_of(&self, id: Uuid) -> ReservationStatus {
        self.store.get_reservation(id).await.unwrap().unwrap().status
    }

    async fn settle(&self, reservation_id: Uuid) {
        let folio = self.store.find_folio_by_reservation(reservation_id).await.unwrap().unwrap();
        self.store
            .post_line_item(&FolioLineItem {
                id: Uuid::new_v4(),
                folio_id: folio.id,
                kind: LineItemKind::Payment,
                description: "Card payment".to_string(),
                amount: -folio.balance,
                posted_at: chrono::Utc::now(),
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_confirm_payment_converts_holds_and_charges_folio() {
    let hotel = Hotel::open(day(5));
    let reservation = hotel.book(day(10), day(13));

    let outcome = hotel
        .desk
        .confirm_payment(reservation.id, Some("card".to_string()))
        .await
        .unwrap();

    assert_eq!(outcome.reservation.status, ReservationStatus::Confirmed);
    assert!(outcome.warning.is_none());
    assert_eq!(outcome.reservation.metadata.payment_method.as_deref(), Some("card"));
    assert!(outcome.reservation.metadata.confirmed_at.is_some());

    let nights = hotel.nights(day(10), day(13)).await;
    assert_eq!(nights.len(), 3);
    assert!(nights.iter().all(|n| n.holds == 0 && n.reserved == 1));
    // check-out night is untouched
    assert_eq!(hotel.nights(day(13), day(14)).await[0].reserved, 0);

    let folio = hotel.desk.folio(reservation.id).await.unwrap();
    assert_eq!(folio.balance, 45000);
    assert_eq!(folio.line_items.len(), 1);
    assert_eq!(folio.line_items[0].kind, LineItemKind::RoomCharge);
    assert!(folio.line_items[0].description.contains("3 nights"));

    assert!(matches!(
        hotel.events.events().as_slice(),
        [FrontDeskEvent::ReservationConfirmed { total_amount: 45000, .. }]
    ));
}

#[tokio::test]
async fn test_confirm_payment_twice_is_rejected_without_changes() {
    let hotel = Hotel::open(day(5));
    let reservation = hotel.book(day(10), day(12));
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();

    let err = hotel.desk.confirm_payment(reservation.id, None).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::InvalidStatus { actual: ReservationStatus::Confirmed, .. }));

    assert!(hotel.nights(day(10), day(12)).await.iter().all(|n| n.reserved == 1 && n.holds == 0));
    assert_eq!(hotel.desk.folio(reservation.id).await.unwrap().balance, 45000);
}

#[tokio::test]
async fn test_confirm_payment_unknown_reservation() {
    let hotel = Hotel::open(day(5));
    let missing = Uuid::new_v4();

    let err = hotel.desk.confirm_payment(missing, None).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::ReservationNotFound(id) if id == missing));
}

#[tokio::test]
async fn test_confirm_payment_missing_hold_changes_nothing() {
    let hotel = Hotel::open(day(5));
    let reservation = hotel.book(day(10), day(13));
    // the middle night lost its hold
    hotel.store.insert_inventory(InventoryDay::new(hotel.hotel_id, hotel.room_type_id, day(11), 4));

    let err = hotel.desk.confirm_payment(reservation.id, None).await.unwrap_err();
    match err {
        FrontDeskError::HoldReleaseError { day: failed, .. } => assert_eq!(failed, day(11)),
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(hotel.status_of(reservation.id).await, ReservationStatus::PendingPayment);
    let nights = hotel.nights(day(10), day(13)).await;
    assert_eq!(nights.iter().map(|n| n.holds).collect::<Vec<_>>(), vec![1, 0, 1]);
    assert!(nights.iter().all(|n| n.reserved == 0));
    assert_eq!(hotel.desk.folio(reservation.id).await.unwrap().balance, 0);
    assert!(hotel.events.events().is_empty());
}

#[tokio::test]
async fn test_confirm_payment_full_night_reports_reserved_increment() {
    let hotel = Hotel::open(day(5));
    let reservation = hotel.book(day(10), day(11));
    hotel.store.insert_inventory(InventoryDay {
        reserved: 4,
        holds: 1,
        ..InventoryDay::new(hotel.hotel_id, hotel.room_type_id, day(10), 4)
    });

    let err = hotel.desk.confirm_payment(reservation.id, None).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::ReservedIncrementError { .. }));
    assert_eq!(hotel.status_of(reservation.id).await, ReservationStatus::PendingPayment);
}

#[tokio::test]
async fn test_confirm_payment_without_folio_warns() {
    let hotel = Hotel::open(day(5));
    let reservation = Reservation::pending(hotel.hotel_id, hotel.room_type_id, day(10), day(11), 15000, "USD", None);
    hotel.store.insert_inventory(InventoryDay {
        holds: 1,
        ..InventoryDay::new(hotel.hotel_id, hotel.room_type_id, day(10), 4)
    });
    hotel.store.insert_reservation(reservation.clone());

    let outcome = hotel.desk.confirm_payment(reservation.id, None).await.unwrap();

    assert_eq!(outcome.reservation.status, ReservationStatus::Confirmed);
    assert!(outcome.warning.unwrap().starts_with("Folio update failed"));
    assert_eq!(hotel.status_of(reservation.id).await, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn test_check_in_occupies_room_and_locks_it() {
    let hotel = Hotel::open(day(10));
    let reservation = hotel.book(day(10), day(12));
    let room = hotel.room("204");
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();

    let notes = Some(Masked::new("Guest passport 123456".to_string()));
    let outcome = hotel.desk.check_in(reservation.id, room.id, notes).await.unwrap();

    assert_eq!(outcome.room_number, "204");
    assert_eq!(outcome.reservation.status, ReservationStatus::CheckedIn);
    assert_eq!(outcome.reservation.room_id, Some(room.id));
    assert_eq!(outcome.reservation.metadata.room_number.as_deref(), Some("204"));
    assert_eq!(
        outcome.reservation.metadata.check_in_notes.as_deref(),
        Some("Guest passport 123456")
    );

    assert_eq!(hotel.desk.room(room.id).await.unwrap().status, RoomStatus::Occupied);

    let locks = hotel.store.room_locks();
    assert_eq!(locks.len(), 1);
    assert_eq!(locks[0].day, day(10));
    assert_eq!(locks[0].reservation_id, reservation.id);

    let kinds: Vec<&str> = hotel.events.events().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["reservation_confirmed", "guest_checked_in", "room_status_changed"]);
}

#[tokio::test]
async fn test_check_in_only_on_arrival_day() {
    let hotel = Hotel::open(day(9));
    let reservation = hotel.book(day(10), day(12));
    let room = hotel.room("101");
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();

    let err = hotel.desk.check_in(reservation.id, room.id, None).await.unwrap_err();
    assert!(matches!(
        err,
        FrontDeskError::InvalidCheckInDate { check_in, today } if check_in == day(10) && today == day(9)
    ));
    assert_eq!(hotel.status_of(reservation.id).await, ReservationStatus::Confirmed);
    assert_eq!(hotel.desk.room(room.id).await.unwrap().status, RoomStatus::Available);
}

#[tokio::test]
async fn test_check_in_requires_confirmation() {
    let hotel = Hotel::open(day(10));
    let reservation = hotel.book(day(10), day(12));
    let room = hotel.room("101");

    let err = hotel.desk.check_in(reservation.id, room.id, None).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::InvalidStatus { actual: ReservationStatus::PendingPayment, .. }));
}

#[tokio::test]
async fn test_check_in_rejects_room_of_other_type() {
    let hotel = Hotel::open(day(10));
    let reservation = hotel.book(day(10), day(12));
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();

    let suite = Room::new(hotel.hotel_id, Uuid::new_v4(), "900");
    hotel.store.insert_room(suite.clone());

    let err = hotel.desk.check_in(reservation.id, suite.id, None).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::RoomTypeMismatch(id) if id == suite.id));
    assert_eq!(hotel.status_of(reservation.id).await, ReservationStatus::Confirmed);
    assert_eq!(hotel.desk.room(suite.id).await.unwrap().status, RoomStatus::Available);
    assert!(hotel.store.room_locks().is_empty());
}

#[tokio::test]
async fn test_check_in_unknown_room() {
    let hotel = Hotel::open(day(10));
    let reservation = hotel.book(day(10), day(12));
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();

    let err = hotel.desk.check_in(reservation.id, Uuid::new_v4(), None).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::RoomNotFound(_)));
}

#[tokio::test]
async fn test_check_in_room_not_available() {
    let hotel = Hotel::open(day(10));
    let reservation = hotel.book(day(10), day(12));
    let room = hotel.room("101");
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();
    hotel.desk.update_housekeeping(room.id, RoomStatus::Maintenance).await.unwrap();

    let err = hotel.desk.check_in(reservation.id, room.id, None).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::RoomNotAvailable { status: RoomStatus::Maintenance, .. }));
    assert_eq!(hotel.status_of(reservation.id).await, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn test_check_out_blocked_by_unpaid_balance() {
    let hotel = Hotel::open(day(10));
    let reservation = hotel.book(day(10), day(12));
    let room = hotel.room("101");
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();
    hotel.desk.check_in(reservation.id, room.id, None).await.unwrap();

    let err = hotel.desk.check_out(reservation.id, None).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::UnpaidBalance { balance: 45000 }));
    assert_eq!(hotel.status_of(reservation.id).await, ReservationStatus::CheckedIn);
    assert_eq!(hotel.desk.room(room.id).await.unwrap().status, RoomStatus::Occupied);
}

#[tokio::test]
async fn test_check_out_settled_sends_room_to_maintenance() {
    let hotel = Hotel::open(day(10));
    let reservation = hotel.book(day(10), day(12));
    let room = hotel.room("101");
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();
    hotel.desk.check_in(reservation.id, room.id, None).await.unwrap();
    hotel.settle(reservation.id).await;

    let outcome = hotel
        .desk
        .check_out(reservation.id, Some(Masked::new("Left keys at desk".to_string())))
        .await
        .unwrap();

    assert_eq!(outcome.final_balance, 0);
    assert_eq!(outcome.reservation.status, ReservationStatus::CheckedOut);
    assert!(outcome.reservation.metadata.checked_out_at.is_some());
    assert_eq!(hotel.desk.room(room.id).await.unwrap().status, RoomStatus::Maintenance);
    assert!(matches!(
        hotel.events.events().last(),
        Some(FrontDeskEvent::GuestCheckedOut { final_balance: 0, .. })
    ));
}

#[tokio::test]
async fn test_check_out_with_credit_balance() {
    let hotel = Hotel::open(day(10));
    let reservation = hotel.book(day(10), day(11));
    let room = hotel.room("101");
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();
    hotel.desk.check_in(reservation.id, room.id, None).await.unwrap();

    let folio = hotel.desk.folio(reservation.id).await.unwrap();
    hotel
        .store
        .post_line_item(&FolioLineItem {
            id: Uuid::new_v4(),
            folio_id: folio.id,
            kind: LineItemKind::Payment,
            description: "Overpayment".to_string(),
            amount: -50000,
            posted_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let outcome = hotel.desk.check_out(reservation.id, None).await.unwrap();
    assert_eq!(outcome.final_balance, -5000);
}

#[tokio::test]
async fn test_check_out_without_folio() {
    let hotel = Hotel::open(day(10));
    let mut reservation = Reservation::pending(hotel.hotel_id, hotel.room_type_id, day(10), day(11), 0, "USD", None);
    reservation.status = ReservationStatus::CheckedIn;
    hotel.store.insert_reservation(reservation.clone());

    let err = hotel.desk.check_out(reservation.id, None).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::FolioNotFound(_)));
}

#[tokio::test]
async fn test_check_out_requires_check_in() {
    let hotel = Hotel::open(day(10));
    let reservation = hotel.book(day(10), day(11));
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();

    let err = hotel.desk.check_out(reservation.id, None).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::InvalidStatus { actual: ReservationStatus::Confirmed, .. }));
}

#[tokio::test]
async fn test_cancel_pending_releases_holds() {
    let hotel = Hotel::open(day(5));
    let reservation = hotel.book(day(10), day(12));

    let cancelled = hotel
        .desk
        .cancel(reservation.id, Some(Masked::new("Change of plans".to_string())))
        .await
        .unwrap();

    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    assert_eq!(cancelled.metadata.cancellation_reason.as_deref(), Some("Change of plans"));
    assert!(hotel.nights(day(10), day(12)).await.iter().all(|n| n.holds == 0 && n.reserved == 0));
}

#[tokio::test]
async fn test_cancel_confirmed_releases_reserved() {
    let hotel = Hotel::open(day(5));
    let reservation = hotel.book(day(10), day(12));
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();

    hotel.desk.cancel(reservation.id, None).await.unwrap();
    assert!(hotel.nights(day(10), day(12)).await.iter().all(|n| n.reserved == 0));

    let err = hotel.desk.cancel(reservation.id, None).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::InvalidStatus { actual: ReservationStatus::Cancelled, .. }));
}

#[tokio::test]
async fn test_expire_stale_holds() {
    let hotel = Hotel::open(day(5));
    let now = FixedClock::on(day(5)).now();

    let mut stale = hotel.book(day(10), day(11));
    stale.hold_expires_at = Some(now - Duration::minutes(1));
    hotel.store.insert_reservation(stale.clone());

    let mut fresh = hotel.book(day(12), day(13));
    fresh.hold_expires_at = Some(now + Duration::minutes(15));
    hotel.store.insert_reservation(fresh.clone());

    let expired = hotel.desk.expire_stale_holds().await.unwrap();

    assert_eq!(expired, vec![stale.id]);
    assert_eq!(hotel.status_of(stale.id).await, ReservationStatus::Expired);
    assert_eq!(hotel.status_of(fresh.id).await, ReservationStatus::PendingPayment);
    assert_eq!(hotel.nights(day(10), day(11)).await[0].holds, 0);
    assert_eq!(hotel.nights(day(12), day(13)).await[0].holds, 1);
}

#[tokio::test]
async fn test_housekeeping_cannot_touch_occupied_room() {
    let hotel = Hotel::open(day(10));
    let reservation = hotel.book(day(10), day(11));
    let room = hotel.room("101");
    hotel.desk.confirm_payment(reservation.id, None).await.unwrap();
    hotel.desk.check_in(reservation.id, room.id, None).await.unwrap();

    let err = hotel.desk.update_housekeeping(room.id, RoomStatus::Available).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::RoomOccupied(_)));

    let err = hotel.desk.update_housekeeping(room.id, RoomStatus::Occupied).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_housekeeping_returns_room_to_service() {
    let hotel = Hotel::open(day(10));
    let room = hotel.room("101");

    hotel.desk.update_housekeeping(room.id, RoomStatus::OutOfOrder).await.unwrap();
    let room = hotel.desk.update_housekeeping(room.id, RoomStatus::Available).await.unwrap();
    assert_eq!(room.status, RoomStatus::Available);
}

#[tokio::test]
async fn test_inventory_range_is_validated() {
    let hotel = Hotel::open(day(10));

    let nights = hotel.desk.inventory(hotel.hotel_id, hotel.room_type_id, day(1), day(8)).await.unwrap();
    assert_eq!(nights.len(), 7);

    let err = hotel.desk.inventory(hotel.hotel_id, hotel.room_type_id, day(8), day(1)).await.unwrap_err();
    assert!(matches!(err, FrontDeskError::InvalidRequest(_)));
}

impl Hotel {
    /// A booking forced into `status`, bypassing the desk.
    fn book_in(&self, status: ReservationStatus) -> Reservation {
        let mut reservation = self.book(day(10), day(12));
        reservation.status = status;
        self.store.insert_reservation(reservation.clone());
        reservation
    }
}

#[tokio::test]
async fn test_confirm_payment_rejects_every_status_but_pending() {
    use ReservationStatus::*;

    for status in [Confirmed, Cancelled, Expired, CheckedIn, CheckedOut] {
        let hotel = Hotel::open(day(10));
        let reservation = hotel.book_in(status);

        let err = hotel.desk.confirm_payment(reservation.id, None).await.unwrap_err();
        assert!(
            matches!(err, FrontDeskError::InvalidStatus { actual, ref expected } if actual == status && expected == "PENDING_PAYMENT"),
            "{:?}: {:?}",
            status,
            err
        );

        assert_eq!(hotel.status_of(reservation.id).await, status);
        assert!(hotel.nights(day(10), day(12)).await.iter().all(|n| n.holds == 1 && n.reserved == 0));
        let folio = hotel.desk.folio(reservation.id).await.unwrap();
        assert_eq!(folio.balance, 0);
        assert!(folio.line_items.is_empty());
        assert!(hotel.events.events().is_empty());
    }
}

#[tokio::test]
async fn test_check_in_rejects_every_status_but_confirmed() {
    use ReservationStatus::*;

    for status in [PendingPayment, Cancelled, Expired, CheckedIn, CheckedOut] {
        let hotel = Hotel::open(day(10));
        let reservation = hotel.book_in(status);
        let room = hotel.room("101");

        let err = hotel.desk.check_in(reservation.id, room.id, None).await.unwrap_err();
        assert!(
            matches!(err, FrontDeskError::InvalidStatus { actual, ref expected } if actual == status && expected == "CONFIRMED"),
            "{:?}: {:?}",
            status,
            err
        );

        assert_eq!(hotel.status_of(reservation.id).await, status);
        assert_eq!(hotel.desk.room(room.id).await.unwrap().status, RoomStatus::Available);
        assert!(hotel.store.room_locks().is_empty());
        assert!(hotel.events.events().is_empty());
    }
}

#[tokio::test]
async fn test_check_out_rejects_every_status_but_checked_in() {
    use ReservationStatus::*;

    for status in [PendingPayment, Confirmed, Cancelled, Expired, CheckedOut] {
        let hotel = Hotel::open(day(10));
        let reservation = hotel.book_in(status);

        let err = hotel.desk.check_out(reservation.id, None).await.unwrap_err();
        assert!(
            matches!(err, FrontDeskError::InvalidStatus { actual, ref expected } if actual == status && expected == "CHECKED_IN"),
            "{:?}: {:?}",
            status,
            err
        );

        let stored = hotel.store.get_reservation(reservation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, status);
        assert!(stored.metadata.checked_out_at.is_none());
        assert_eq!(hotel.desk.folio(reservation.id).await.unwrap().balance, 0);
        assert!(hotel.events.events().is_empty());
    }
}

#[tokio::test]
async fn test_confirm_payment_zero_night_stay() {
    let hotel = Hotel::open(day(5));
    let reservation = hotel.book(day(10), day(10));

    let outcome = hotel.desk.confirm_payment(reservation.id, None).await.unwrap();
    assert_eq!(outcome.reservation.status, ReservationStatus::Confirmed);
    assert!(outcome.warning.is_none());

    let nights = hotel.nights(day(10), day(11)).await;
    assert_eq!(nights.len(), 1);
    assert_eq!((nights[0].holds, nights[0].reserved), (0, 0));

    let folio = hotel.desk.folio(reservation.id).await.unwrap();
    assert_eq!(folio.balance, 45000);
    assert!(folio.line_items[0].description.contains("0 nights"));
}
