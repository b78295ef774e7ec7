pub mod error;

pub use error::SchedulingError;
