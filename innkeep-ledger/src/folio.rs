use chrono::{DateTime, Utc};
use innkeep_core::{Folio, FolioLineItem, LineItemKind, Reservation};
use uuid::Uuid;

use crate::nights::stay_nights;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Line item {item_id} belongs to folio {item_folio}, not {folio}")]
    WrongFolio {
        item_id: Uuid,
        item_folio: Uuid,
        folio: Uuid,
    },

    #[error("Folio {0} balance overflow")]
    BalanceOverflow(Uuid),
}

/// Charge for the whole stay, posted when payment is confirmed.
pub fn room_charge(folio_id: Uuid, reservation: &Reservation, posted_at: DateTime<Utc>) -> FolioLineItem {
    let nights = stay_nights(reservation.check_in, reservation.check_out).len();
    FolioLineItem {
        id: Uuid::new_v4(),
        folio_id,
        kind: LineItemKind::RoomCharge,
        description: format!(
            "Room charge: {} night{} ({} to {})",
            nights,
            if nights == 1 { "" } else { "s" },
            reservation.check_in,
            reservation.check_out
        ),
        amount: reservation.total_amount,
        posted_at,
    }
}

/// Append `item` to `folio` and move the balance by its amount.
pub fn post_line_item(folio: &mut Folio, item: FolioLineItem) -> Result<(), LedgerError> {
    if item.folio_id != folio.id {
        return Err(LedgerError::WrongFolio {
            item_id: item.id,
            item_folio: item.folio_id,
            folio: folio.id,
        });
    }

    folio.balance = folio
        .balance
        .checked_add(item.amount)
        .ok_or(LedgerError::BalanceOverflow(folio.id))?;
    folio.line_items.push(item);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reservation(total: i64) -> Reservation {
        Reservation::pending(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 13).unwrap(),
            total,
            "EUR",
            None,
        )
    }

    #[test]
    fn test_room_charge_posts_full_stay() {
        let reservation = reservation(45000);
        let mut folio = Folio::open(reservation.id, "EUR");

        let charge = room_charge(folio.id, &reservation, Utc::now());
        assert_eq!(charge.description, "Room charge: 3 nights (2024-01-10 to 2024-01-13)");

        post_line_item(&mut folio, charge).unwrap();
        assert_eq!(folio.balance, 45000);
        assert_eq!(folio.line_items.len(), 1);
        assert!(folio.has_outstanding_balance());
    }

    #[test]
    fn test_payment_settles_balance() {
        let reservation = reservation(10000);
        let mut folio = Folio::open(reservation.id, "EUR");
        let charge = room_charge(folio.id, &reservation, Utc::now());
        post_line_item(&mut folio, charge).unwrap();

        let payment = FolioLineItem {
            id: Uuid::new_v4(),
            folio_id: folio.id,
            kind: LineItemKind::Payment,
            description: "Card payment".to_string(),
            amount: -10000,
            posted_at: Utc::now(),
        };
        post_line_item(&mut folio, payment).unwrap();
        assert_eq!(folio.balance, 0);
        assert!(!folio.has_outstanding_balance());
    }

    #[test]
    fn test_item_for_other_folio_is_rejected() {
        let reservation = reservation(10000);
        let mut folio = Folio::open(reservation.id, "EUR");
        let stray = room_charge(Uuid::new_v4(), &reservation, Utc::now());

        assert!(matches!(
            post_line_item(&mut folio, stray),
            Err(LedgerError::WrongFolio { .. })
        ));
        assert_eq!(folio.balance, 0);
    }
}
