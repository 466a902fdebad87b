pub mod booking;
pub mod payment;
pub mod pricing;

pub use booking::{BookingDraft, GuestContact, Meal, Occupancy, RoomSnapshot, Stay};
pub use payment::{PaymentOrder, PaymentOutcome, PaymentStatus, Settlement};
pub use pricing::{FeeSchedule, PriceBreakdown};
