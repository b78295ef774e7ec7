pub mod availability;
pub mod calendar;
pub mod slots;
pub mod timezone;

pub use availability::{annotate_slots, parse_appointment_rows};
pub use calendar::{available_dates, available_weekdays, build_index};
pub use slots::SlotGenerator;
