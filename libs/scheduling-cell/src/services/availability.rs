use chrono::FixedOffset;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{AppointmentRecord, AppointmentStatus, GeneratedSlot, SlotStatus};
use crate::services::timezone::parse_timestamp;

/// Mark each generated slot booked or available against existing bookings.
///
/// A slot is booked iff at least one active appointment of the same doctor
/// overlaps it half-open: `appt.start < slot.end && appt.end > slot.start`.
/// Terminal statuses (completed, cancelled, no-show) free the slot. When a
/// caller is rescheduling, the appointment being moved is excluded via
/// `exclude_appointment_id` so its own slot reads as available.
pub fn annotate_slots(
    slots: Vec<GeneratedSlot>,
    appointments: &[AppointmentRecord],
    exclude_appointment_id: Option<i64>,
) -> Vec<GeneratedSlot> {
    let active: Vec<&AppointmentRecord> = appointments
        .iter()
        .filter(|appt| appt.status.is_active())
        .filter(|appt| Some(appt.id) != exclude_appointment_id)
        .collect();

    slots
        .into_iter()
        .map(|mut slot| {
            let booked = active.iter().any(|appt| appt.overlaps(&slot));
            slot.status = if booked {
                SlotStatus::Booked
            } else {
                SlotStatus::Available
            };
            slot
        })
        .collect()
}

// Appointment rows arrive with timestamps that are sometimes zoned and
// sometimes naive, so they are normalized through parse_timestamp instead of
// being deserialized directly.
#[derive(Debug, Deserialize)]
struct RawAppointmentRow {
    id: i64,
    #[serde(alias = "doctorId")]
    doctor_id: i64,
    #[serde(alias = "startTime")]
    start_time: String,
    #[serde(alias = "endTime")]
    end_time: String,
    status: AppointmentStatus,
}

/// Normalize raw appointment rows from the appointments API into clinic-local
/// records. Rows with unparseable timestamps are treated as non-overlapping
/// and skipped with a warning; reconciliation never fails because of one bad
/// record.
pub fn parse_appointment_rows(offset: FixedOffset, rows: &[Value]) -> Vec<AppointmentRecord> {
    let mut records = Vec::new();

    for row in rows {
        let raw: RawAppointmentRow = match serde_json::from_value(row.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping malformed appointment row: {}", e);
                continue;
            }
        };

        let start_time = match parse_timestamp(offset, &raw.start_time) {
            Ok(ts) => ts,
            Err(e) => {
                warn!("Skipping appointment {}: {}", raw.id, e);
                continue;
            }
        };
        let end_time = match parse_timestamp(offset, &raw.end_time) {
            Ok(ts) => ts,
            Err(e) => {
                warn!("Skipping appointment {}: {}", raw.id, e);
                continue;
            }
        };

        records.push(AppointmentRecord {
            id: raw.id,
            doctor_id: raw.doctor_id,
            start_time,
            end_time,
            status: raw.status,
        });
    }

    debug!("Parsed {} appointment records", records.len());
    records
}
