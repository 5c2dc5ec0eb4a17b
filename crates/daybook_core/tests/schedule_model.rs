use chrono::NaiveDateTime;
use daybook_core::model::schedule::{
    is_same_day, is_valid_name, is_valid_ordering, is_within_day_window,
};
use daybook_core::{Schedule, ScheduleValidationError, DATETIME_FORMAT};
use uuid::Uuid;

fn dt(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).unwrap()
}

fn person_id(text: &str) -> Uuid {
    Uuid::parse_str(text).unwrap()
}

#[test]
fn new_builds_a_valid_schedule_with_fresh_id() {
    let schedule = Schedule::new(
        "Project Meeting",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 12:00"),
    )
    .unwrap();

    assert!(!schedule.id.is_nil());
    assert_eq!(schedule.name, "Project Meeting");
    assert!(schedule.participants.is_empty());
    assert!(schedule.validate().is_ok());
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = Schedule::with_id(
        Uuid::nil(),
        "Meeting",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 11:00"),
    )
    .unwrap_err();
    assert_eq!(err, ScheduleValidationError::NilId);
}

#[test]
fn name_rule_accepts_alphanumeric_words_with_single_spaces() {
    assert!(is_valid_name("Meeting"));
    assert!(is_valid_name("CS2103 Lecture 7"));
    assert!(is_valid_name("1on1"));

    assert!(!is_valid_name(""));
    assert!(!is_valid_name(" Meeting"));
    assert!(!is_valid_name("Meeting "));
    assert!(!is_valid_name("Team  Sync"));
    assert!(!is_valid_name("Stand-up"));
    assert!(!is_valid_name("Lunch_Break"));
}

#[test]
fn construction_rejects_invalid_name() {
    let err = Schedule::new(
        "Stand-up",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 11:00"),
    )
    .unwrap_err();
    assert!(matches!(err, ScheduleValidationError::InvalidName(name) if name == "Stand-up"));
}

#[test]
fn construction_rejects_reversed_range() {
    let start = dt("2026-03-02 11:00");
    let end = dt("2026-03-02 10:00");

    let err = Schedule::new("Meeting", start, end).unwrap_err();
    assert_eq!(err, ScheduleValidationError::StartAfterEnd { start, end });
}

#[test]
fn equal_start_and_end_instants_are_allowed() {
    let at = dt("2026-03-02 10:00");
    let reminder = Schedule::new("Standup Reminder", at, at).unwrap();
    assert_eq!(reminder.start, reminder.end);
}

#[test]
fn construction_rejects_range_crossing_midnight() {
    let start = dt("2026-03-02 20:00");
    let end = dt("2026-03-03 09:00");

    let err = Schedule::new("Meeting", start, end).unwrap_err();
    assert_eq!(err, ScheduleValidationError::NotSameDay { start, end });
}

#[test]
fn reversed_range_is_reported_before_day_mismatch() {
    let start = dt("2026-03-03 10:00");
    let end = dt("2026-03-02 10:00");

    let err = Schedule::new("Meeting", start, end).unwrap_err();
    assert_eq!(err, ScheduleValidationError::StartAfterEnd { start, end });
}

#[test]
fn day_window_boundaries_are_inclusive() {
    assert!(Schedule::new("Early Call", dt("2026-03-02 08:00"), dt("2026-03-02 09:00")).is_ok());
    assert!(Schedule::new("Late Call", dt("2026-03-02 20:00"), dt("2026-03-02 21:00")).is_ok());
}

#[test]
fn times_outside_the_day_window_are_rejected() {
    let before_window = Schedule::new(
        "Sunrise Run",
        dt("2026-03-02 07:59"),
        dt("2026-03-02 09:00"),
    )
    .unwrap_err();
    assert!(matches!(
        before_window,
        ScheduleValidationError::OutsideDayWindow { .. }
    ));

    let after_window = Schedule::new(
        "Night Shift",
        dt("2026-03-02 20:00"),
        dt("2026-03-02 21:01"),
    )
    .unwrap_err();
    assert!(matches!(
        after_window,
        ScheduleValidationError::OutsideDayWindow { .. }
    ));

    let midnight = Schedule::new(
        "Midnight Walk",
        dt("2026-03-02 00:00"),
        dt("2026-03-02 01:00"),
    )
    .unwrap_err();
    assert!(matches!(
        midnight,
        ScheduleValidationError::OutsideDayWindow { .. }
    ));
}

#[test]
fn add_participants_skips_already_attached_persons() {
    let alice = person_id("11111111-2222-4333-8444-555555555555");
    let bob = person_id("66666666-7777-4888-9999-aaaaaaaaaaaa");

    let mut schedule = Schedule::new(
        "Meeting",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 11:00"),
    )
    .unwrap();
    schedule.add_participants(&[alice, bob]);
    schedule.add_participants(&[bob, alice]);

    assert_eq!(schedule.participants, vec![alice, bob]);
    assert!(schedule.has_participant(alice));
}

#[test]
fn remove_participant_reports_absence() {
    let alice = person_id("11111111-2222-4333-8444-555555555555");
    let bob = person_id("66666666-7777-4888-9999-aaaaaaaaaaaa");

    let mut schedule = Schedule::new(
        "Meeting",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 11:00"),
    )
    .unwrap();
    schedule.add_participants(&[alice]);

    assert!(schedule.remove_participant(alice));
    assert!(!schedule.remove_participant(bob));
    assert!(schedule.participants.is_empty());
}

#[test]
fn validate_rejects_duplicate_participants() {
    let alice = person_id("11111111-2222-4333-8444-555555555555");

    let mut schedule = Schedule::new(
        "Meeting",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 11:00"),
    )
    .unwrap();
    schedule.participants = vec![alice, alice];

    let err = schedule.validate().unwrap_err();
    assert_eq!(err, ScheduleValidationError::DuplicateParticipant(alice));
}

#[test]
fn same_event_identity_ignores_ids_and_participants() {
    let alice = person_id("11111111-2222-4333-8444-555555555555");

    let mut first = Schedule::new(
        "Meeting",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 11:00"),
    )
    .unwrap();
    first.add_participants(&[alice]);
    let second = Schedule::new(
        "Meeting",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 11:00"),
    )
    .unwrap();

    assert!(first.is_same_event(&second));
    assert_ne!(first, second);

    let renamed = Schedule::new(
        "Sync",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 11:00"),
    )
    .unwrap();
    assert!(!first.is_same_event(&renamed));
}

#[test]
fn overlap_is_strict_so_touching_endpoints_do_not_conflict() {
    let morning = Schedule::new(
        "Morning Block",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 11:00"),
    )
    .unwrap();
    let afternoon = Schedule::new(
        "Afternoon Block",
        dt("2026-03-02 11:00"),
        dt("2026-03-02 12:00"),
    )
    .unwrap();
    let nested = Schedule::new(
        "Nested Call",
        dt("2026-03-02 10:15"),
        dt("2026-03-02 10:45"),
    )
    .unwrap();
    let reminder_inside = Schedule::new(
        "Reminder",
        dt("2026-03-02 10:30"),
        dt("2026-03-02 10:30"),
    )
    .unwrap();
    let reminder_on_boundary = Schedule::new(
        "Boundary Reminder",
        dt("2026-03-02 11:00"),
        dt("2026-03-02 11:00"),
    )
    .unwrap();

    assert!(!morning.overlaps(&afternoon));
    assert!(!afternoon.overlaps(&morning));
    assert!(morning.overlaps(&nested));
    assert!(morning.overlaps(&reminder_inside));
    assert!(!morning.overlaps(&reminder_on_boundary));
}

#[test]
fn display_uses_the_human_datetime_format() {
    let schedule = Schedule::new(
        "Project Meeting",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 14:30"),
    )
    .unwrap();

    assert_eq!(
        schedule.to_string(),
        "Project Meeting from 02 Mar 2026 10:00AM to 02 Mar 2026 02:30PM"
    );
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let schedule_id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let alice = person_id("66666666-7777-4888-9999-aaaaaaaaaaaa");
    let mut schedule = Schedule::with_id(
        schedule_id,
        "Project Meeting",
        dt("2026-03-02 10:00"),
        dt("2026-03-02 12:00"),
    )
    .unwrap();
    schedule.add_participants(&[alice]);

    let json = serde_json::to_value(&schedule).unwrap();
    assert_eq!(json["id"], schedule_id.to_string());
    assert_eq!(json["name"], "Project Meeting");
    assert_eq!(json["start"], "2026-03-02T10:00:00");
    assert_eq!(json["end"], "2026-03-02T12:00:00");
    assert_eq!(json["participants"][0], alice.to_string());

    let decoded: Schedule = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, schedule);
}

#[test]
fn deserialize_rejects_out_of_window_times() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "name": "Sunrise Run",
        "start": "2026-03-02T07:00:00",
        "end": "2026-03-02T09:00:00",
        "participants": []
    });

    let err = serde_json::from_value::<Schedule>(value).unwrap_err();
    assert!(
        err.to_string().contains("must stay inside 08:00-21:00"),
        "unexpected error: {err}"
    );
}

#[test]
fn deserialize_rejects_duplicate_participants() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "name": "Meeting",
        "start": "2026-03-02T10:00:00",
        "end": "2026-03-02T11:00:00",
        "participants": [
            "66666666-7777-4888-9999-aaaaaaaaaaaa",
            "66666666-7777-4888-9999-aaaaaaaaaaaa"
        ]
    });

    let err = serde_json::from_value::<Schedule>(value).unwrap_err();
    assert!(
        err.to_string().contains("duplicate participant"),
        "unexpected error: {err}"
    );
}

#[test]
fn standalone_predicates_match_the_construction_rules() {
    assert!(is_valid_ordering(dt("2026-03-02 10:00"), dt("2026-03-02 10:00")));
    assert!(!is_valid_ordering(dt("2026-03-02 11:00"), dt("2026-03-02 10:00")));

    assert!(is_same_day(dt("2026-03-02 08:00"), dt("2026-03-02 21:00")));
    assert!(!is_same_day(dt("2026-03-02 20:00"), dt("2026-03-03 09:00")));

    assert!(is_within_day_window(dt("2026-03-02 08:00"), dt("2026-03-02 21:00")));
    assert!(!is_within_day_window(dt("2026-03-02 07:59"), dt("2026-03-02 09:00")));
    assert!(!is_within_day_window(dt("2026-03-02 09:00"), dt("2026-03-02 21:01")));
}
