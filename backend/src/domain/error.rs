use thiserror::Error;

/// Failure taxonomy for the booking domain.
///
/// Range errors and `SeatAlreadyTaken` are deliberately separate variants:
/// the former mean the client sent malformed data, the latter means another
/// purchaser holds the seat and retrying with a different one makes sense.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("cargo must be in range [1, {cargo_num}], not {cargo}")]
    CargoOutOfRange { cargo: i64, cargo_num: i64 },

    #[error("seat must be in range [1, {places_in_cargo}], not {seat}")]
    SeatOutOfRange { seat: i64, places_in_cargo: i64 },

    #[error("seat {seat} in cargo {cargo} is already taken for journey {journey_id}")]
    SeatAlreadyTaken {
        journey_id: i64,
        cargo: i64,
        seat: i64,
    },

    /// Should not occur given upstream invariants; logged as fatal if seen.
    #[error("invalid train configuration: cargo_num={cargo_num}, places_in_cargo={places_in_cargo}")]
    InvalidTrainConfig {
        cargo_num: i64,
        places_in_cargo: i64,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BookingError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        BookingError::NotFound { entity, id }
    }
}
