use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the scheduling core.
///
/// Only schedule validation and timestamp parsing are fallible; slot
/// generation, reconciliation and calendar aggregation degrade to fewer
/// slots instead of failing.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),
}
