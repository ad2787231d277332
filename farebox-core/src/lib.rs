pub mod clock;
pub mod error;
pub mod hold;
pub mod lock;
pub mod reservation;
pub mod store;
pub mod trip;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BookingError, BookingResult};
pub use hold::SeatHold;
pub use lock::TripLocks;
pub use reservation::{PassengerInfo, Reservation, SeatAssignment};
pub use store::SeatStore;
pub use trip::Trip;
