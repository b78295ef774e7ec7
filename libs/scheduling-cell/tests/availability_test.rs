use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::json;

use scheduling_cell::models::{
    AppointmentRecord, AppointmentStatus, GeneratedSlot, RecurringSchedule, SlotStatus,
};
use scheduling_cell::services::availability::{annotate_slots, parse_appointment_rows};
use scheduling_cell::services::slots::SlotGenerator;
use scheduling_cell::services::timezone::parse_time_of_day;
use shared_config::ClinicConfig;

fn generator() -> SlotGenerator {
    SlotGenerator::new(&ClinicConfig::default())
}

// 2025-06-02 is a Monday.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn monday_slots() -> Vec<GeneratedSlot> {
    let row = RecurringSchedule {
        id: 1,
        doctor_id: 10,
        clinic_id: 5,
        day_of_week: 1,
        start_time: parse_time_of_day("09:00").unwrap(),
        end_time: parse_time_of_day("11:00").unwrap(),
        slot_duration_minutes: 30,
        valid_from: None,
        valid_to: None,
    };
    generator().generate(&[row], monday())
}

fn ts(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).unwrap()
}

fn appointment(id: i64, doctor_id: i64, start: &str, end: &str, status: AppointmentStatus) -> AppointmentRecord {
    AppointmentRecord {
        id,
        doctor_id,
        start_time: ts(start),
        end_time: ts(end),
        status,
    }
}

fn statuses(slots: &[GeneratedSlot]) -> Vec<SlotStatus> {
    slots.iter().map(|s| s.status).collect()
}

#[test]
fn test_no_appointments_leaves_all_slots_available() {
    let annotated = annotate_slots(monday_slots(), &[], None);
    assert_eq!(annotated.len(), 4);
    assert!(annotated.iter().all(|s| s.is_available()));
}

#[test]
fn test_exact_overlap_books_only_that_slot() {
    let appts = vec![appointment(
        100,
        10,
        "2025-06-02T10:00:00+08:00",
        "2025-06-02T10:30:00+08:00",
        AppointmentStatus::Scheduled,
    )];

    let annotated = annotate_slots(monday_slots(), &appts, None);

    assert_eq!(
        statuses(&annotated),
        vec![
            SlotStatus::Available,
            SlotStatus::Available,
            SlotStatus::Booked,
            SlotStatus::Available,
        ]
    );
}

#[test]
fn test_partial_overlap_books_both_touched_slots() {
    let appts = vec![appointment(
        100,
        10,
        "2025-06-02T10:15:00+08:00",
        "2025-06-02T10:45:00+08:00",
        AppointmentStatus::Confirmed,
    )];

    let annotated = annotate_slots(monday_slots(), &appts, None);

    assert_eq!(
        statuses(&annotated),
        vec![
            SlotStatus::Available,
            SlotStatus::Available,
            SlotStatus::Booked,
            SlotStatus::Booked,
        ]
    );
}

#[test]
fn test_adjacent_appointment_does_not_book_neighbouring_slot() {
    // Half-open intervals: an appointment ending exactly at 10:00 leaves the
    // 10:00 slot free.
    let appts = vec![appointment(
        100,
        10,
        "2025-06-02T09:30:00+08:00",
        "2025-06-02T10:00:00+08:00",
        AppointmentStatus::Scheduled,
    )];

    let annotated = annotate_slots(monday_slots(), &appts, None);

    assert_eq!(
        statuses(&annotated),
        vec![
            SlotStatus::Available,
            SlotStatus::Booked,
            SlotStatus::Available,
            SlotStatus::Available,
        ]
    );
}

#[test]
fn test_terminal_statuses_do_not_occupy_slots() {
    for status in [
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ] {
        let appts = vec![appointment(
            100,
            10,
            "2025-06-02T10:00:00+08:00",
            "2025-06-02T10:30:00+08:00",
            status,
        )];
        let annotated = annotate_slots(monday_slots(), &appts, None);
        assert!(
            annotated.iter().all(|s| s.is_available()),
            "{:?} should not book a slot",
            status
        );
    }
}

#[test]
fn test_every_active_status_occupies_its_slot() {
    for status in [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::CheckedIn,
        AppointmentStatus::InProgress,
    ] {
        let appts = vec![appointment(
            100,
            10,
            "2025-06-02T09:00:00+08:00",
            "2025-06-02T09:30:00+08:00",
            status,
        )];
        let annotated = annotate_slots(monday_slots(), &appts, None);
        assert_eq!(annotated[0].status, SlotStatus::Booked, "{:?}", status);
    }
}

#[test]
fn test_other_doctors_appointment_is_ignored() {
    let appts = vec![appointment(
        100,
        99,
        "2025-06-02T10:00:00+08:00",
        "2025-06-02T10:30:00+08:00",
        AppointmentStatus::Scheduled,
    )];

    let annotated = annotate_slots(monday_slots(), &appts, None);
    assert!(annotated.iter().all(|s| s.is_available()));
}

#[test]
fn test_reschedule_excludes_the_appointment_being_moved() {
    let appts = vec![appointment(
        100,
        10,
        "2025-06-02T10:00:00+08:00",
        "2025-06-02T10:30:00+08:00",
        AppointmentStatus::Confirmed,
    )];

    let without_exclusion = annotate_slots(monday_slots(), &appts, None);
    assert_eq!(without_exclusion[2].status, SlotStatus::Booked);

    // Moving appointment 100: its own slot must read as available.
    let with_exclusion = annotate_slots(monday_slots(), &appts, Some(100));
    assert!(with_exclusion.iter().all(|s| s.is_available()));
}

#[test]
fn test_zero_length_appointment_never_overlaps() {
    let appts = vec![appointment(
        100,
        10,
        "2025-06-02T10:00:00+08:00",
        "2025-06-02T10:00:00+08:00",
        AppointmentStatus::Scheduled,
    )];

    let annotated = annotate_slots(monday_slots(), &appts, None);
    assert!(annotated.iter().all(|s| s.is_available()));
}

#[test]
fn test_parse_appointment_rows_normalizes_naive_and_zoned_timestamps() {
    let offset = generator().offset();
    let rows = vec![
        // Naive timestamps are clinic-local.
        json!({
            "id": 1,
            "doctor_id": 10,
            "start_time": "2025-06-02T10:00:00",
            "end_time": "2025-06-02T10:30:00",
            "status": "scheduled"
        }),
        // Same instant expressed in UTC.
        json!({
            "id": 2,
            "doctorId": 10,
            "startTime": "2025-06-02T02:00:00Z",
            "endTime": "2025-06-02T02:30:00Z",
            "status": "confirmed"
        }),
    ];

    let records = parse_appointment_rows(offset, &rows);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].start_time, records[1].start_time);
    assert_eq!(records[0].end_time, records[1].end_time);
}

#[test]
fn test_parse_appointment_rows_skips_malformed_records() {
    let offset = generator().offset();
    let rows = vec![
        json!({
            "id": 1,
            "doctor_id": 10,
            "start_time": "garbage",
            "end_time": "2025-06-02T10:30:00",
            "status": "scheduled"
        }),
        json!({
            "id": 2,
            "doctor_id": 10,
            "start_time": "2025-06-02T10:00:00",
            "end_time": "2025-06-02T10:30:00",
            "status": "not_a_status"
        }),
        json!({
            "id": 3,
            "doctor_id": 10,
            "start_time": "2025-06-02T10:00:00",
            "end_time": "2025-06-02T10:30:00",
            "status": "checked_in"
        }),
    ];

    let records = parse_appointment_rows(offset, &rows);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 3);
    assert_eq!(records[0].status, AppointmentStatus::CheckedIn);
}

#[test]
fn test_annotation_does_not_reorder_or_drop_slots() {
    let slots = monday_slots();
    let starts: Vec<_> = slots.iter().map(|s| s.start).collect();

    let appts = vec![appointment(
        100,
        10,
        "2025-06-02T09:00:00+08:00",
        "2025-06-02T11:00:00+08:00",
        AppointmentStatus::Scheduled,
    )];
    let annotated = annotate_slots(slots, &appts, None);

    assert_eq!(annotated.iter().map(|s| s.start).collect::<Vec<_>>(), starts);
    assert!(annotated.iter().all(|s| s.status == SlotStatus::Booked));
}
