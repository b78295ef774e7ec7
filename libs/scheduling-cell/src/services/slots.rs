use chrono::{Duration, FixedOffset, NaiveDate};
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::ClinicConfig;

use crate::models::{GeneratedSlot, RecurringSchedule, SlotStatus};
use crate::services::timezone::local_to_absolute;

/// Turns recurring weekly schedules into concrete bookable slots for a date.
///
/// Pure with respect to I/O: schedule rows come in as data, slots come out as
/// data, and the only ambient input is the clinic offset captured at
/// construction.
pub struct SlotGenerator {
    offset: FixedOffset,
}

impl SlotGenerator {
    pub fn new(config: &ClinicConfig) -> Self {
        Self {
            offset: config.clinic_offset(),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Generate the ordered slots for one date from a doctor's schedule rows.
    ///
    /// Rows whose weekday or validity window excludes the date contribute
    /// nothing. Malformed rows (non-positive duration, inverted times) are
    /// skipped with a warning so the remaining rows still produce slots.
    /// Overlapping rows are a data-quality issue upstream; exact duplicate
    /// start instants are collapsed, everything else is kept.
    pub fn generate(&self, schedules: &[RecurringSchedule], date: NaiveDate) -> Vec<GeneratedSlot> {
        let mut slots = Vec::new();

        for schedule in schedules {
            if !schedule.applies_to(date) || !schedule.is_valid_for(date) {
                continue;
            }
            slots.extend(self.slots_for_schedule(schedule, date));
        }

        slots.sort_by(|a, b| a.start.cmp(&b.start));
        slots.dedup_by(|a, b| a.start == b.start && a.doctor_id == b.doctor_id);

        debug!("Generated {} slots for {}", slots.len(), date);
        slots
    }

    /// Walk one schedule row from start to end in whole slot steps. The loop
    /// stops as soon as the next slot would run past the row's end time, so a
    /// trailing remainder is dropped rather than truncated into a short slot.
    fn slots_for_schedule(
        &self,
        schedule: &RecurringSchedule,
        date: NaiveDate,
    ) -> Vec<GeneratedSlot> {
        if schedule.slot_duration_minutes <= 0 {
            warn!(
                "Skipping schedule {} with non-positive slot duration {}",
                schedule.id, schedule.slot_duration_minutes
            );
            return Vec::new();
        }
        if schedule.start_time >= schedule.end_time {
            warn!(
                "Skipping schedule {} with start time {} not before end time {}",
                schedule.id, schedule.start_time, schedule.end_time
            );
            return Vec::new();
        }

        let step = Duration::minutes(schedule.slot_duration_minutes);
        let window_start = local_to_absolute(self.offset, date, schedule.start_time);
        let window_end = local_to_absolute(self.offset, date, schedule.end_time);

        let mut slots = Vec::new();
        let mut current = window_start;

        while current + step <= window_end {
            slots.push(GeneratedSlot {
                doctor_id: schedule.doctor_id,
                clinic_id: schedule.clinic_id,
                start: current,
                end: current + step,
                status: SlotStatus::Available,
            });
            current += step;
        }

        slots
    }

    /// Normalize raw schedule rows from the schedule-management API.
    /// Unparseable rows are skipped with a warning, not fatal: valid rows in
    /// the same payload must still produce slots.
    pub fn parse_schedule_rows(&self, rows: &[Value]) -> Vec<RecurringSchedule> {
        rows.iter()
            .filter_map(|row| match serde_json::from_value(row.clone()) {
                Ok(schedule) => Some(schedule),
                Err(e) => {
                    warn!("Skipping malformed schedule row: {}", e);
                    None
                }
            })
            .collect()
    }
}
