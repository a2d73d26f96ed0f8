use chrono::NaiveDate;
use innkeep_core::{InventoryAdjustment, InventoryDay, InventoryViolation};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Apply one adjustment to a night's counters.
///
/// The result must keep `holds >= 0`, `reserved >= 0` and
/// `reserved + holds <= total`. Pure: the input is left untouched.
pub fn apply_adjustment(
    day: &InventoryDay,
    adjustment: &InventoryAdjustment,
) -> Result<InventoryDay, InventoryViolation> {
    let holds = day.holds + adjustment.holds_delta;
    let reserved = day.reserved + adjustment.reserved_delta;

    if holds < 0 {
        return Err(InventoryViolation::HoldUnderflow);
    }
    if reserved < 0 {
        return Err(InventoryViolation::ReservedUnderflow);
    }
    if reserved + holds > day.total {
        return Err(InventoryViolation::OverCapacity);
    }

    Ok(InventoryDay {
        holds,
        reserved,
        ..day.clone()
    })
}

type LedgerKey = (Uuid, Uuid, NaiveDate);

/// In-memory day ledger for every (hotel, room type, night).
#[derive(Debug, Default, Clone)]
pub struct InventoryLedger {
    days: BTreeMap<LedgerKey, InventoryDay>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or reset) a night with `total` sellable rooms.
    pub fn initialize(&mut self, hotel_id: Uuid, room_type_id: Uuid, day: NaiveDate, total: i32) {
        self.days.insert(
            (hotel_id, room_type_id, day),
            InventoryDay::new(hotel_id, room_type_id, day, total),
        );
    }

    /// Put a night into a given state directly (seeding holds from a booking flow).
    pub fn insert(&mut self, day: InventoryDay) {
        self.days.insert((day.hotel_id, day.room_type_id, day.day), day);
    }

    pub fn get(&self, hotel_id: Uuid, room_type_id: Uuid, day: NaiveDate) -> Option<&InventoryDay> {
        self.days.get(&(hotel_id, room_type_id, day))
    }

    /// Nights in `[from, to)` that exist in the ledger, ordered by day.
    pub fn range(&self, hotel_id: Uuid, room_type_id: Uuid, from: NaiveDate, to: NaiveDate) -> Vec<InventoryDay> {
        if from >= to {
            return Vec::new();
        }
        self.days
            .range((hotel_id, room_type_id, from)..(hotel_id, room_type_id, to))
            .map(|(_, day)| day.clone())
            .collect()
    }

    /// Apply every adjustment or none of them.
    ///
    /// On failure returns the first offending night and leaves the ledger unchanged.
    pub fn apply_all(
        &mut self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        adjustments: &[InventoryAdjustment],
    ) -> Result<(), (NaiveDate, InventoryViolation)> {
        let mut staged: BTreeMap<LedgerKey, InventoryDay> = BTreeMap::new();

        for adjustment in adjustments {
            let key = (hotel_id, room_type_id, adjustment.day);
            let current = staged
                .get(&key)
                .or_else(|| self.days.get(&key))
                .ok_or((adjustment.day, InventoryViolation::MissingDay))?;
            let next = apply_adjustment(current, adjustment).map_err(|v| (adjustment.day, v))?;
            staged.insert(key, next);
        }

        self.days.extend(staged);
        Ok(())
    }
}
