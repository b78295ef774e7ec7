use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use shared_models::SchedulingError;

use crate::services::timezone::iso_weekday;

/// A doctor's standing weekly availability block.
///
/// Day of week follows ISO-8601: 1 = Monday .. 7 = Sunday. Times of day are
/// naive and interpreted in the clinic timezone for the date in question.
/// Rows are created and mutated by the schedule-management API; this cell
/// only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSchedule {
    #[serde(default)]
    pub id: i64,
    #[serde(alias = "doctorId")]
    pub doctor_id: i64,
    #[serde(alias = "clinicId", default)]
    pub clinic_id: i64,
    #[serde(alias = "dayOfWeek")]
    pub day_of_week: u32,
    #[serde(
        alias = "startTime",
        deserialize_with = "de_time_of_day",
        serialize_with = "ser_time_of_day"
    )]
    pub start_time: NaiveTime,
    #[serde(
        alias = "endTime",
        deserialize_with = "de_time_of_day",
        serialize_with = "ser_time_of_day"
    )]
    pub end_time: NaiveTime,
    #[serde(alias = "slotDurationMinutes", alias = "durationMinutes", alias = "duration_minutes")]
    pub slot_duration_minutes: i64,
    #[serde(alias = "validFrom", default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(alias = "validTo", default)]
    pub valid_to: Option<NaiveDate>,
}

impl RecurringSchedule {
    /// Whether this row's weekday matches the given date's clinic-local weekday.
    pub fn applies_to(&self, date: NaiveDate) -> bool {
        iso_weekday(date) == self.day_of_week
    }

    /// Whether the validity window admits the given date. Both bounds are
    /// inclusive; a missing bound is unbounded on that side.
    pub fn is_valid_for(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.valid_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.valid_to {
            if date > to {
                return false;
            }
        }
        true
    }

    /// Number of whole slots this row can yield on a matching day.
    /// A trailing remainder shorter than one slot is dropped.
    pub fn slot_capacity(&self) -> i64 {
        if self.slot_duration_minutes <= 0 || self.start_time >= self.end_time {
            return 0;
        }
        let total_minutes = (self.end_time - self.start_time).num_minutes();
        total_minutes / self.slot_duration_minutes
    }

    /// Validate the row the way schedule creation does upstream.
    pub fn validate(&self) -> Result<(), SchedulingError> {
        if self.day_of_week < 1 || self.day_of_week > 7 {
            return Err(SchedulingError::Validation(
                "Day of week must be between 1 (Monday) and 7 (Sunday)".to_string(),
            ));
        }
        if self.start_time >= self.end_time {
            return Err(SchedulingError::Validation(
                "Start time must be before end time".to_string(),
            ));
        }
        if self.slot_duration_minutes <= 0 {
            return Err(SchedulingError::Validation(
                "Slot duration must be greater than 0".to_string(),
            ));
        }
        if (self.end_time - self.start_time).num_minutes() < self.slot_duration_minutes {
            return Err(SchedulingError::Validation(
                "Schedule duration is too short for the specified slot duration".to_string(),
            ));
        }
        if let (Some(from), Some(to)) = (self.valid_from, self.valid_to) {
            if from > to {
                return Err(SchedulingError::Validation(
                    "Valid from date must be before or equal to valid to date".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Booked,
}

/// One bookable interval derived from a schedule row for a concrete date.
/// Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSlot {
    pub doctor_id: i64,
    pub clinic_id: i64,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub status: SlotStatus,
}

impl GeneratedSlot {
    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Booking statuses as the appointments API reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    #[serde(alias = "checked-in")]
    CheckedIn,
    #[serde(alias = "in-progress")]
    InProgress,
    Completed,
    Cancelled,
    #[serde(alias = "no-show")]
    NoShow,
}

impl AppointmentStatus {
    /// Whether this status still occupies its slot. Terminal statuses
    /// (completed, cancelled, no-show) free the slot for rebooking.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled
                | AppointmentStatus::Confirmed
                | AppointmentStatus::CheckedIn
                | AppointmentStatus::InProgress
        )
    }
}

/// Existing booking for a doctor, used only for overlap comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: i64,
    #[serde(alias = "doctorId")]
    pub doctor_id: i64,
    #[serde(alias = "startTime")]
    pub start_time: DateTime<FixedOffset>,
    #[serde(alias = "endTime")]
    pub end_time: DateTime<FixedOffset>,
    pub status: AppointmentStatus,
}

impl AppointmentRecord {
    /// Half-open interval overlap against a slot of the same doctor.
    /// Zero-length intervals never overlap anything.
    pub fn overlaps(&self, slot: &GeneratedSlot) -> bool {
        self.doctor_id == slot.doctor_id
            && self.start_time < slot.end
            && self.end_time > slot.start
    }
}

/// Derived calendar view over a lookahead window: which dates still have a
/// free slot and which weekdays carry any schedule at all. Rebuilt whenever
/// the schedule or appointment set changes; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityIndex {
    pub today: NaiveDate,
    pub lookahead_days: i64,
    pub bookable_dates: BTreeSet<NaiveDate>,
    pub scheduled_weekdays: BTreeSet<u32>,
}

impl AvailabilityIndex {
    pub fn is_bookable(&self, date: NaiveDate) -> bool {
        self.bookable_dates.contains(&date)
    }

    pub fn has_schedule_on_weekday(&self, weekday: u32) -> bool {
        self.scheduled_weekdays.contains(&weekday)
    }
}

// Schedule APIs send times of day both with and without seconds.
fn de_time_of_day<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    crate::services::timezone::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
}

fn ser_time_of_day<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format("%H:%M:%S").to_string())
}
