use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::models::{AppointmentRecord, AvailabilityIndex, RecurringSchedule};
use crate::services::availability::annotate_slots;
use crate::services::slots::SlotGenerator;

/// ISO weekdays on which at least one schedule row can yield a slot.
///
/// A static pre-filter for calendar UIs: independent of any concrete date,
/// it only asks whether the row's window is wide enough for one slot.
pub fn available_weekdays(schedules: &[RecurringSchedule]) -> BTreeSet<u32> {
    schedules
        .iter()
        .filter(|schedule| schedule.slot_capacity() >= 1)
        .map(|schedule| schedule.day_of_week)
        .collect()
}

/// Dates within `today ..= today + lookahead_days` that still have at least
/// one free slot after reconciling against the doctor's appointments.
///
/// This is the most expensive computation in the cell
/// (O(lookahead_days x slots per day)); callers cache the result and rebuild
/// it when the doctor, window, schedule set or appointment set changes.
/// `today` is an explicit argument so the scan stays deterministic.
pub fn available_dates(
    generator: &SlotGenerator,
    schedules: &[RecurringSchedule],
    appointments: &[AppointmentRecord],
    today: NaiveDate,
    lookahead_days: i64,
) -> BTreeSet<NaiveDate> {
    let mut dates = BTreeSet::new();

    for offset_days in 0..=lookahead_days.max(0) {
        let date = today + Duration::days(offset_days);
        let slots = generator.generate(schedules, date);
        if slots.is_empty() {
            continue;
        }

        let annotated = annotate_slots(slots, appointments, None);
        if annotated.iter().any(|slot| slot.is_available()) {
            dates.insert(date);
        }
    }

    debug!(
        "Found {} bookable dates in the {} day window from {}",
        dates.len(),
        lookahead_days,
        today
    );
    dates
}

/// Build both calendar views in one pass. This is the unit callers memoize.
pub fn build_index(
    generator: &SlotGenerator,
    schedules: &[RecurringSchedule],
    appointments: &[AppointmentRecord],
    today: NaiveDate,
    lookahead_days: i64,
) -> AvailabilityIndex {
    AvailabilityIndex {
        today,
        lookahead_days,
        bookable_dates: available_dates(generator, schedules, appointments, today, lookahead_days),
        scheduled_weekdays: available_weekdays(schedules),
    }
}
