//! Capacity model and seat validation.
//!
//! Pure range checks against a train's physical layout. Uniqueness of a
//! (cargo, seat) pair per journey is not checked here: it needs a view of
//! existing tickets and is enforced by the storage layer's unique constraint.

use crate::domain::error::BookingError;
use shared::Train;

/// Total seating capacity of a train layout.
///
/// Both inputs must be positive and their product must fit in `i64`;
/// anything else means corrupt train data.
pub fn capacity(cargo_num: i64, places_in_cargo: i64) -> Result<i64, BookingError> {
    if cargo_num <= 0 || places_in_cargo <= 0 {
        return Err(BookingError::InvalidTrainConfig {
            cargo_num,
            places_in_cargo,
        });
    }
    cargo_num
        .checked_mul(places_in_cargo)
        .ok_or(BookingError::InvalidTrainConfig {
            cargo_num,
            places_in_cargo,
        })
}

/// Check that a (cargo, seat) pair fits within the train's layout.
///
/// Runs before any uniqueness check so that out-of-range input surfaces as a
/// client error rather than a conflict.
pub fn validate_seat(cargo: i64, seat: i64, train: &Train) -> Result<(), BookingError> {
    if !(1..=train.cargo_num).contains(&cargo) {
        return Err(BookingError::CargoOutOfRange {
            cargo,
            cargo_num: train.cargo_num,
        });
    }
    if !(1..=train.places_in_cargo).contains(&seat) {
        return Err(BookingError::SeatOutOfRange {
            seat,
            places_in_cargo: train.places_in_cargo,
        });
    }
    Ok(())
}
