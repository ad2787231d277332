use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact details for the travelling party.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A group booking of one or more seats on a single trip.
///
/// `holder_id` is `None` for guest bookings. `confirmed` is set only by
/// the external payment-confirmation signal; once true the reservation
/// is immutable through this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub holder_id: Option<String>,
    pub passenger: PassengerInfo,
    pub seats_booked: u32,
    pub assignments: Vec<SeatAssignment>,
    pub total_amount: i64,
    pub currency: String,
    pub booked_at: DateTime<Utc>,
    pub confirmed: bool,
}

impl Reservation {
    pub fn seat_numbers(&self) -> Vec<u32> {
        self.assignments.iter().map(|a| a.seat_number).collect()
    }
}

/// The binding of one specific seat number to a reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub seat_number: u32,
    pub issued_at: DateTime<Utc>,
}

impl SeatAssignment {
    /// Row/column label for a 1-based seat number, e.g. seat 5 with 4
    /// seats per row is "B1". Degenerate inputs (seat 0, zero-wide
    /// rows) are clamped rather than panicking; row letters wrap
    /// after Z.
    pub fn label(&self, seats_per_row: u32) -> String {
        let seats_per_row = seats_per_row.max(1);
        let index = self.seat_number.saturating_sub(1);
        let row = index / seats_per_row;
        let col = index % seats_per_row + 1;
        let row_letter = char::from(b'A' + (row % 26) as u8);
        format!("{}{}", row_letter, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(seat_number: u32) -> SeatAssignment {
        SeatAssignment {
            seat_number,
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn seat_labels_follow_row_column_layout() {
        assert_eq!(assignment(1).label(4), "A1");
        assert_eq!(assignment(4).label(4), "A4");
        assert_eq!(assignment(5).label(4), "B1");
        assert_eq!(assignment(12).label(4), "C4");
    }

    #[test]
    fn seat_labels_tolerate_degenerate_layouts() {
        // A zero-wide row is treated as width 1, seat 0 as seat 1.
        assert_eq!(assignment(5).label(0), "E1");
        assert_eq!(assignment(0).label(4), "A1");
    }
}
