use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

/// Reservation status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    PendingPayment,
    Confirmed,
    Cancelled,
    Expired,
    CheckedIn,
    CheckedOut,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 6] = [
        ReservationStatus::PendingPayment,
        ReservationStatus::Confirmed,
        ReservationStatus::Cancelled,
        ReservationStatus::Expired,
        ReservationStatus::CheckedIn,
        ReservationStatus::CheckedOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::PendingPayment => "PENDING_PAYMENT",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Expired => "EXPIRED",
            ReservationStatus::CheckedIn => "CHECKED_IN",
            ReservationStatus::CheckedOut => "CHECKED_OUT",
        }
    }

    /// Forward edges of the lifecycle. Nothing ever moves backwards.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (PendingPayment, Confirmed)
                | (PendingPayment, Cancelled)
                | (PendingPayment, Expired)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (CheckedIn, CheckedOut)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_PAYMENT" => Ok(ReservationStatus::PendingPayment),
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            "EXPIRED" => Ok(ReservationStatus::Expired),
            "CHECKED_IN" => Ok(ReservationStatus::CheckedIn),
            "CHECKED_OUT" => Ok(ReservationStatus::CheckedOut),
            other => Err(CoreError::UnknownReservationStatus(other.to_string())),
        }
    }
}

/// Front desk stamps kept alongside a reservation.
///
/// Stored as a JSON column. Keys written by older clients that are not listed
/// here are dropped on read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReservationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_out_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reservation {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_type_id: Uuid,
    pub room_id: Option<Uuid>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: ReservationStatus,
    /// Full stay amount in minor currency units.
    pub total_amount: i64,
    pub currency: String,
    pub hold_expires_at: Option<DateTime<Utc>>,
    pub metadata: ReservationMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// A freshly booked reservation holding inventory until `hold_expires_at`.
    pub fn pending(
        hotel_id: Uuid,
        room_type_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        total_amount: i64,
        currency: &str,
        hold_expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            hotel_id,
            room_type_id,
            room_id: None,
            check_in,
            check_out,
            status: ReservationStatus::PendingPayment,
            total_amount,
            currency: currency.to_string(),
            hold_expires_at,
            metadata: ReservationMetadata::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_hold_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::PendingPayment
            && self.hold_expires_at.is_some_and(|expires| expires <= now)
    }
}
