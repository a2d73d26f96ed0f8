use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineItemKind {
    RoomCharge,
    Payment,
    Adjustment,
}

impl LineItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemKind::RoomCharge => "ROOM_CHARGE",
            LineItemKind::Payment => "PAYMENT",
            LineItemKind::Adjustment => "ADJUSTMENT",
        }
    }
}

impl fmt::Display for LineItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineItemKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROOM_CHARGE" => Ok(LineItemKind::RoomCharge),
            "PAYMENT" => Ok(LineItemKind::Payment),
            "ADJUSTMENT" => Ok(LineItemKind::Adjustment),
            other => Err(CoreError::UnknownLineItemKind(other.to_string())),
        }
    }
}

/// A single posting on a folio. Never deleted; corrections are new postings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolioLineItem {
    pub id: Uuid,
    pub folio_id: Uuid,
    pub kind: LineItemKind,
    pub description: String,
    /// Positive amounts are charges, negative amounts are payments/credits.
    pub amount: i64,
    pub posted_at: DateTime<Utc>,
}

/// Running balance of charges and payments for one reservation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Folio {
    pub id: Uuid,
    pub reservation_id: Uuid,
    /// Minor currency units. Positive means the guest owes money.
    pub balance: i64,
    pub currency: String,
    #[serde(default)]
    pub line_items: Vec<FolioLineItem>,
}

impl Folio {
    pub fn open(reservation_id: Uuid, currency: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            reservation_id,
            balance: 0,
            currency: currency.to_string(),
            line_items: Vec::new(),
        }
    }

    pub fn has_outstanding_balance(&self) -> bool {
        self.balance > 0
    }
}
