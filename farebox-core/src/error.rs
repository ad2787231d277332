use uuid::Uuid;

pub type BookingResult<T> = Result<T, BookingError>;

/// Failure taxonomy of the booking core. Every variant except
/// `Internal` is an expected, recoverable validation outcome whose
/// message is safe to render to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("the trip has already departed")]
    TripDeparted,

    #[error("seat {0} is no longer available")]
    SeatUnavailable(u32),

    #[error("seat {0} is temporarily held by another user")]
    HoldConflict(u32),

    #[error("invalid seat number {seat}: trip capacity is {capacity}")]
    CapacityExceeded { seat: u32, capacity: u32 },

    #[error("you can only book up to {limit} seats for the same trip; you have already booked {booked}")]
    QuotaExceeded { limit: u32, booked: u32 },

    #[error("{0}")]
    InvalidState(String),

    #[error("internal error, please try again")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    pub fn trip_not_found(id: Uuid) -> Self {
        BookingError::NotFound(format!("trip {}", id))
    }

    pub fn reservation_not_found(id: Uuid) -> Self {
        BookingError::NotFound(format!("reservation {}", id))
    }

    /// Wraps a storage failure. The source is logged here; the variant
    /// itself renders a generic retry prompt and leaks no detail.
    pub fn internal(source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        tracing::error!(error = %source, "storage operation failed");
        BookingError::Internal(source)
    }
}
