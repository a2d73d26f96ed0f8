use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use innkeep_core::{
    Folio, FolioLineItem, FolioRepository, InventoryDay, InventoryRepository, Reservation,
    ReservationMetadata, ReservationRepository, ReservationStatus, ReservationTransition, Room,
    RoomLock, RoomRepository, RoomStatus, StoreError, StoreResult,
};
use innkeep_ledger::apply_adjustment;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Pool, Postgres};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn corrupt(err: innkeep_core::CoreError) -> StoreError {
    StoreError::Backend(format!("corrupt row: {}", err))
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    hotel_id: Uuid,
    room_type_id: Uuid,
    room_id: Option<Uuid>,
    check_in: NaiveDate,
    check_out: NaiveDate,
    status: String,
    total_amount: i64,
    currency: String,
    hold_expires_at: Option<DateTime<Utc>>,
    metadata: Json<ReservationMetadata>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = StoreError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: row.id,
            hotel_id: row.hotel_id,
            room_type_id: row.room_type_id,
            room_id: row.room_id,
            check_in: row.check_in,
            check_out: row.check_out,
            status: row.status.parse().map_err(corrupt)?,
            total_amount: row.total_amount,
            currency: row.currency,
            hold_expires_at: row.hold_expires_at,
            metadata: row.metadata.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    hotel_id: Uuid,
    room_type_id: Uuid,
    number: String,
    status: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RoomRow> for Room {
    type Error = StoreError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Room {
            id: row.id,
            hotel_id: row.hotel_id,
            room_type_id: row.room_type_id,
            number: row.number,
            status: row.status.parse().map_err(corrupt)?,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct InventoryRow {
    hotel_id: Uuid,
    room_type_id: Uuid,
    day: NaiveDate,
    total: i32,
    reserved: i32,
    holds: i32,
}

impl From<InventoryRow> for InventoryDay {
    fn from(row: InventoryRow) -> Self {
        InventoryDay {
            hotel_id: row.hotel_id,
            room_type_id: row.room_type_id,
            day: row.day,
            total: row.total,
            reserved: row.reserved,
            holds: row.holds,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FolioRow {
    id: Uuid,
    reservation_id: Uuid,
    balance: i64,
    currency: String,
}

#[derive(sqlx::FromRow)]
struct LineItemRow {
    id: Uuid,
    folio_id: Uuid,
    kind: String,
    description: String,
    amount: i64,
    posted_at: DateTime<Utc>,
}

impl TryFrom<LineItemRow> for FolioLineItem {
    type Error = StoreError;

    fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
        Ok(FolioLineItem {
            id: row.id,
            folio_id: row.folio_id,
            kind: row.kind.parse().map_err(corrupt)?,
            description: row.description,
            amount: row.amount,
            posted_at: row.posted_at,
        })
    }
}

const RESERVATION_COLUMNS: &str = "id, hotel_id, room_type_id, room_id, check_in, check_out, status, \
     total_amount, currency, hold_expires_at, metadata, created_at, updated_at";

const ROOM_COLUMNS: &str = "id, hotel_id, room_type_id, number, status, updated_at";

const INVENTORY_COLUMNS: &str = "hotel_id, room_type_id, day, total, reserved, holds";

/// PostgreSQL-backed front desk store.
///
/// Every lifecycle step runs in one transaction with row locks on the
/// inventory nights it touches; status guards are part of the `UPDATE`.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_line_items<'e, E>(executor: E, folio_id: Uuid) -> StoreResult<Vec<FolioLineItem>>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let rows: Vec<LineItemRow> = sqlx::query_as(
            "SELECT id, folio_id, kind, description, amount, posted_at \
             FROM folio_line_items WHERE folio_id = $1 ORDER BY posted_at, id",
        )
        .bind(folio_id)
        .fetch_all(executor)
        .await
        .map_err(backend)?;

        rows.into_iter().map(FolioLineItem::try_from).collect()
    }
}

#[async_trait]
impl ReservationRepository for PgStore {
    async fn get_reservation(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reservations WHERE id = $1",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(Reservation::try_from).transpose()
    }

    async fn apply_transition(&self, transition: &ReservationTransition) -> StoreResult<()> {
        let next = &transition.reservation;
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let updated = sqlx::query(
            "UPDATE reservations \
             SET status = $1, room_id = $2, hold_expires_at = $3, metadata = $4, updated_at = $5 \
             WHERE id = $6 AND status = $7",
        )
        .bind(next.status.as_str())
        .bind(next.room_id)
        .bind(next.hold_expires_at)
        .bind(Json(&next.metadata))
        .bind(next.updated_at)
        .bind(next.id)
        .bind(transition.expected_status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        if updated.rows_affected() == 0 {
            let actual: Option<String> =
                sqlx::query_scalar("SELECT status FROM reservations WHERE id = $1")
                    .bind(next.id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(backend)?;

            return Err(match actual {
                None => StoreError::NotFound { entity: "reservation", id: next.id.to_string() },
                Some(status) => StoreError::StaleReservation {
                    id: next.id,
                    expected: transition.expected_status,
                    actual: status.parse::<ReservationStatus>().map_err(corrupt)?,
                },
            });
        }

        if let Some(room_change) = &transition.room {
            let moved = sqlx::query(
                "UPDATE rooms SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4",
            )
            .bind(room_change.status.as_str())
            .bind(next.updated_at)
            .bind(room_change.room_id)
            .bind(room_change.expected.as_str())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

            if moved.rows_affected() == 0 {
                let actual: Option<String> = sqlx::query_scalar("SELECT status FROM rooms WHERE id = $1")
                    .bind(room_change.room_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(backend)?;

                return Err(match actual {
                    None => StoreError::NotFound { entity: "room", id: room_change.room_id.to_string() },
                    Some(status) => StoreError::StaleRoom {
                        id: room_change.room_id,
                        expected: room_change.expected,
                        actual: status.parse::<RoomStatus>().map_err(corrupt)?,
                    },
                });
            }
        }

        for adjustment in &transition.inventory {
            let row: Option<InventoryRow> = sqlx::query_as(&format!(
                "SELECT {} FROM inventory_days \
                 WHERE hotel_id = $1 AND room_type_id = $2 AND day = $3 FOR UPDATE",
                INVENTORY_COLUMNS
            ))
            .bind(next.hotel_id)
            .bind(next.room_type_id)
            .bind(adjustment.day)
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;

            let current = row.map(InventoryDay::from).ok_or(StoreError::Inventory {
                day: adjustment.day,
                violation: innkeep_core::InventoryViolation::MissingDay,
            })?;
            let counted = apply_adjustment(&current, adjustment)
                .map_err(|violation| StoreError::Inventory { day: adjustment.day, violation })?;

            sqlx::query(
                "UPDATE inventory_days SET reserved = $1, holds = $2 \
                 WHERE hotel_id = $3 AND room_type_id = $4 AND day = $5",
            )
            .bind(counted.reserved)
            .bind(counted.holds)
            .bind(next.hotel_id)
            .bind(next.room_type_id)
            .bind(adjustment.day)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn list_expired_holds(&self, now: DateTime<Utc>) -> StoreResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reservations \
             WHERE status = 'PENDING_PAYMENT' AND hold_expires_at <= $1 \
             ORDER BY hold_expires_at",
            RESERVATION_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(Reservation::try_from).collect()
    }
}

#[async_trait]
impl RoomRepository for PgStore {
    async fn get_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
        let row: Option<RoomRow> = sqlx::query_as(&format!("SELECT {} FROM rooms WHERE id = $1", ROOM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(Room::try_from).transpose()
    }

    async fn update_room_status(
        &self,
        id: Uuid,
        expected: Option<RoomStatus>,
        status: RoomStatus,
    ) -> StoreResult<Room> {
        let row: Option<RoomRow> = sqlx::query_as(&format!(
            "UPDATE rooms SET status = $1, updated_at = NOW() \
             WHERE id = $2 AND ($3::TEXT IS NULL OR status = $3) \
             RETURNING {}",
            ROOM_COLUMNS
        ))
        .bind(status.as_str())
        .bind(id)
        .bind(expected.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => Room::try_from(row),
            None => {
                let current = self.get_room(id).await?.ok_or_else(|| StoreError::NotFound {
                    entity: "room",
                    id: id.to_string(),
                })?;
                Err(StoreError::StaleRoom {
                    id,
                    expected: expected.unwrap_or(current.status),
                    actual: current.status,
                })
            }
        }
    }

    async fn insert_room_lock(&self, lock: &RoomLock) -> StoreResult<()> {
        sqlx::query("INSERT INTO room_locks (room_id, day, reservation_id) VALUES ($1, $2, $3)")
            .bind(lock.room_id)
            .bind(lock.day)
            .bind(lock.reservation_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(format!(
                    "room {} already locked for {}",
                    lock.room_id, lock.day
                )),
                _ => backend(e),
            })?;
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for PgStore {
    async fn list_inventory(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<InventoryDay>> {
        let rows: Vec<InventoryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM inventory_days \
             WHERE hotel_id = $1 AND room_type_id = $2 AND day >= $3 AND day < $4 \
             ORDER BY day",
            INVENTORY_COLUMNS
        ))
        .bind(hotel_id)
        .bind(room_type_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(InventoryDay::from).collect())
    }
}

#[async_trait]
impl FolioRepository for PgStore {
    async fn find_folio_by_reservation(&self, reservation_id: Uuid) -> StoreResult<Option<Folio>> {
        let row: Option<FolioRow> = sqlx::query_as(
            "SELECT id, reservation_id, balance, currency FROM folios WHERE reservation_id = $1",
        )
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let line_items = Self::load_line_items(&self.pool, row.id).await?;
        Ok(Some(Folio {
            id: row.id,
            reservation_id: row.reservation_id,
            balance: row.balance,
            currency: row.currency,
            line_items,
        }))
    }

    async fn post_line_item(&self, item: &FolioLineItem) -> StoreResult<Folio> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row: Option<FolioRow> = sqlx::query_as(
            "UPDATE folios SET balance = balance + $1, updated_at = NOW() WHERE id = $2 \
             RETURNING id, reservation_id, balance, currency",
        )
        .bind(item.amount)
        .bind(item.folio_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?;

        let row = row.ok_or_else(|| StoreError::NotFound {
            entity: "folio",
            id: item.folio_id.to_string(),
        })?;

        sqlx::query(
            "INSERT INTO folio_line_items (id, folio_id, kind, description, amount, posted_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(item.id)
        .bind(item.folio_id)
        .bind(item.kind.as_str())
        .bind(&item.description)
        .bind(item.amount)
        .bind(item.posted_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        let line_items = Self::load_line_items(&mut *tx, row.id).await?;
        tx.commit().await.map_err(backend)?;

        Ok(Folio {
            id: row.id,
            reservation_id: row.reservation_id,
            balance: row.balance,
            currency: row.currency,
            line_items,
        })
    }
}
