//! Bounds check of a requested seat against the hall grid.
//!
//! Only coordinates are checked here. Whether the seat is already taken is
//! decided by the `tickets_performance_row_seat_key` unique index when the
//! ticket is written.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::models::Hall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatField {
    Row,
    Seat,
}

impl SeatField {
    /// Имя атрибута зала, ограничивающего это поле
    pub fn hall_attribute(&self) -> &'static str {
        match self {
            SeatField::Row => "rows",
            SeatField::Seat => "seats_in_row",
        }
    }
}

impl fmt::Display for SeatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SeatField::Row => "row",
            SeatField::Seat => "seat",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} number must be in available range: (1, {}): (1, {max})", .field.hall_attribute())]
pub struct SeatOutOfRange {
    pub field: SeatField,
    pub value: i32,
    pub max: i32,
}

/// Row is checked before seat; the first violation is returned.
pub fn validate_ticket(row: i32, seat: i32, hall: &Hall) -> Result<(), SeatOutOfRange> {
    check_bound(SeatField::Row, row, hall.rows)?;
    check_bound(SeatField::Seat, seat, hall.seats_in_row)
}

fn check_bound(field: SeatField, value: i32, max: i32) -> Result<(), SeatOutOfRange> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(SeatOutOfRange { field, value, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hall(rows: i32, seats_in_row: i32) -> Hall {
        Hall { id: 1, name: "Main Hall".into(), rows, seats_in_row }
    }

    #[test]
    fn seat_inside_the_grid_is_accepted() {
        let h = hall(10, 20);
        assert_eq!(validate_ticket(5, 10, &h), Ok(()));
        assert_eq!(validate_ticket(1, 1, &h), Ok(()));
        assert_eq!(validate_ticket(10, 20, &h), Ok(()));
    }

    #[test]
    fn row_fifteen_in_a_ten_row_hall() {
        let err = validate_ticket(15, 10, &hall(10, 20)).unwrap_err();
        assert_eq!(err.field, SeatField::Row);
        assert_eq!(err.value, 15);
        assert_eq!(
            err.to_string(),
            "row number must be in available range: (1, rows): (1, 10)"
        );
    }

    #[test]
    fn seat_error_names_seats_in_row() {
        let err = validate_ticket(1, 21, &hall(10, 20)).unwrap_err();
        assert_eq!(err.field, SeatField::Seat);
        assert_eq!(
            err.to_string(),
            "seat number must be in available range: (1, seats_in_row): (1, 20)"
        );
    }

    #[test]
    fn zero_and_negative_coordinates_are_out_of_range() {
        let h = hall(10, 20);
        assert_eq!(validate_ticket(0, 5, &h).unwrap_err().field, SeatField::Row);
        assert_eq!(validate_ticket(3, -1, &h).unwrap_err().field, SeatField::Seat);
    }

    #[test]
    fn row_is_reported_before_seat() {
        let err = validate_ticket(11, 21, &hall(10, 20)).unwrap_err();
        assert_eq!(err.field, SeatField::Row);
    }

    proptest! {
        #[test]
        fn every_seat_of_the_grid_is_valid(
            (rows, seats, row, seat) in (1..=60i32, 1..=60i32)
                .prop_flat_map(|(r, s)| (Just(r), Just(s), 1..=r, 1..=s))
        ) {
            prop_assert!(validate_ticket(row, seat, &hall(rows, seats)).is_ok());
        }

        #[test]
        fn rows_outside_the_grid_fail(rows in 1..=60i32, seats in 1..=60i32, row in -100..=200i32) {
            prop_assume!(row < 1 || row > rows);
            let err = validate_ticket(row, 1, &hall(rows, seats)).unwrap_err();
            prop_assert_eq!(err.field, SeatField::Row);
            prop_assert_eq!(err.max, rows);
        }

        #[test]
        fn seats_outside_the_row_fail(rows in 1..=60i32, seats in 1..=60i32, seat in -100..=200i32) {
            prop_assume!(seat < 1 || seat > seats);
            let err = validate_ticket(1, seat, &hall(rows, seats)).unwrap_err();
            prop_assert_eq!(err.field, SeatField::Seat);
            prop_assert_eq!(err.max, seats);
        }
    }
}
