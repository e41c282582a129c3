//! End-to-end organizer scenarios over the in-memory store.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use lifeos_core::record::hhmm;
use lifeos_core::{
    Event, FixedClock, MemoryStore, NewRecord, Organizer, Quadrant, Rating, RecordPatch,
    TaskDetails, TimerState,
};

fn organizer_at(local: &str) -> (Organizer<MemoryStore>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::at_local(local.parse().unwrap()));
    let organizer = Organizer::load(MemoryStore::new(), clock.clone()).unwrap();
    (organizer, clock)
}

fn details(importance: f64, urgency: f64) -> TaskDetails {
    TaskDetails::new(Rating::new(importance).unwrap(), Rating::new(urgency).unwrap())
}

fn date(s: &str) -> NaiveDate {
    hhmm::parse_date(s).unwrap()
}

/// Test: completing a 5/3 task due today earns exactly 200 XP.
#[test]
fn test_complete_credits_matrix_reward() {
    let (mut org, _clock) = organizer_at("2025-12-14T10:00:00");
    let id = org
        .create(NewRecord::task("Ship release", details(5.0, 3.0)).with_deadline(Some(date("2025-12-14"))))
        .unwrap()
        .id;
    let before = org.xp();

    let event = org.complete(&id).unwrap().unwrap();
    match event {
        Event::TaskCompleted { earned_xp, xp, .. } => {
            assert_eq!(earned_xp, 200);
            assert_eq!(xp, before + 200);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(org.get(&id).unwrap().earned_xp, Some(200));
}

/// Test: completing twice credits once and keeps the first timestamp.
#[test]
fn test_complete_is_idempotent() {
    let (mut org, clock) = organizer_at("2025-12-14T10:00:00");
    let id = org.create(NewRecord::task("Once", details(2.0, 2.0))).unwrap().id;

    org.complete(&id).unwrap();
    let first = org.get(&id).unwrap().completed_at;
    clock.advance(Duration::minutes(5));
    assert!(org.complete(&id).unwrap().is_none());

    assert_eq!(org.xp(), 90);
    assert_eq!(org.get(&id).unwrap().completed_at, first);
}

/// Test: three tasks of 30/60/45 minutes from 08:00 pack end to end.
#[test]
fn test_timetable_packs_from_start_time() {
    let (mut org, _clock) = organizer_at("2025-12-14T07:00:00");
    for (text, minutes) in [("a", 30), ("b", 60), ("c", 45)] {
        org.create(NewRecord::task(text, details(3.0, 3.0).with_duration(minutes)))
            .unwrap();
    }

    let slots = org.timetable(hhmm::parse_time("08:00").unwrap()).unwrap();
    let spans: Vec<(String, String)> = slots
        .iter()
        .map(|s| (hhmm::format_time(s.start), hhmm::format_time(s.end)))
        .collect();
    assert_eq!(
        spans,
        [
            ("08:00".to_string(), "08:30".to_string()),
            ("08:30".to_string(), "09:30".to_string()),
            ("09:30".to_string(), "10:15".to_string()),
        ]
    );
}

/// Test: snooze moves a set deadline by one day and an unset one to tomorrow.
#[test]
fn test_snooze_deadlines() {
    let (mut org, _clock) = organizer_at("2025-12-20T18:00:00");
    let dated = org
        .create(NewRecord::task("dated", details(3.0, 3.0)).with_deadline(Some(date("2025-12-14"))))
        .unwrap()
        .id;
    let undated = org.create(NewRecord::task("undated", details(3.0, 3.0))).unwrap().id;

    org.snooze(&dated).unwrap();
    org.snooze(&undated).unwrap();

    assert_eq!(org.get(&dated).unwrap().deadline, Some(date("2025-12-15")));
    assert_eq!(org.get(&undated).unwrap().deadline, Some(date("2025-12-21")));
    assert_eq!(org.timer_state(), TimerState::Idle);
}

/// Test: switching from X to Y leaves X frozen.
#[test]
fn test_switch_freezes_previous_task() {
    let (mut org, clock) = organizer_at("2025-12-14T09:00:00");
    let x = org.create(NewRecord::task("x", details(3.0, 3.0))).unwrap().id;
    let y = org.create(NewRecord::task("y", details(3.0, 3.0))).unwrap().id;

    org.toggle(&x).unwrap();
    clock.advance(Duration::seconds(20));
    org.toggle(&y).unwrap();
    let frozen = org.get(&x).unwrap().elapsed_time;

    clock.advance(Duration::seconds(100));
    org.settle().unwrap();
    assert_eq!(org.active_task_id(), Some(&y));
    assert_eq!(org.get(&x).unwrap().elapsed_time, frozen);
    assert_eq!(org.get(&y).unwrap().elapsed_time, 100);
}

/// Test: overdue tasks head the focus queue; completed ones leave it.
#[test]
fn test_focus_queue_and_matrix() {
    let (mut org, _clock) = organizer_at("2025-12-14T09:00:00");
    let overdue = org
        .create(NewRecord::task("overdue", details(1.0, 1.0)).with_deadline(Some(date("2025-12-10"))))
        .unwrap()
        .id;
    org.create(NewRecord::task("important", details(5.0, 1.0)).with_deadline(Some(date("2025-12-15"))))
        .unwrap();
    let done = org.create(NewRecord::task("done", details(5.0, 5.0))).unwrap().id;
    org.complete(&done).unwrap();

    let queue = org.focus_queue().unwrap();
    let texts: Vec<&str> = queue.iter().map(|r| r.record.text.as_str()).collect();
    assert_eq!(texts, ["overdue", "important"]);
    assert!(queue[0].score.overdue);
    assert_eq!(queue[0].record.id, overdue);

    let matrix = org.matrix().unwrap();
    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix.quadrant(Quadrant::Schedule)[0].record.text, "important");
    assert_eq!(matrix.quadrant(Quadrant::Eliminate)[0].record.text, "overdue");
}

/// Test: editing a completed record is refused and nothing is stored.
#[test]
fn test_completed_records_are_read_only() {
    let (mut org, _clock) = organizer_at("2025-12-14T09:00:00");
    let id = org.create(NewRecord::task("done", details(3.0, 3.0))).unwrap().id;
    org.complete(&id).unwrap();
    let before = org.get(&id).unwrap();

    let patch = RecordPatch {
        text: Some("renamed".into()),
        ..Default::default()
    };
    assert!(org.update(&id, &patch).is_err());
    assert!(org.snooze(&id).is_err());
    assert_eq!(org.get(&id).unwrap(), before);
}

/// Test: export then import into a fresh organizer reproduces every field.
#[test]
fn test_export_import_roundtrip() {
    let (mut org, clock) = organizer_at("2025-12-14T09:00:00");
    let task = org
        .create(
            NewRecord::task("Write", details(4.5, 2.0).with_duration(25))
                .with_deadline(Some(date("2025-12-18"))),
        )
        .unwrap()
        .id;
    org.toggle(&task).unwrap();
    clock.advance(Duration::seconds(75));
    org.complete(&task).unwrap();
    org.create(NewRecord::event(
        "Gym",
        date("2025-12-16"),
        lifeos_core::EventDetails {
            event_type: lifeos_core::EventType::Workout,
            start_time: Some(hhmm::parse_time("18:00").unwrap()),
            end_time: Some(hhmm::parse_time("19:00").unwrap()),
        },
    ))
    .unwrap();

    let json = org.export().unwrap().to_json().unwrap();
    let snapshot = lifeos_core::Snapshot::from_json(&json).unwrap();

    let (mut restored, _clock) = organizer_at("2026-01-01T09:00:00");
    restored.import(snapshot).unwrap();
    assert_eq!(restored.records().unwrap(), org.records().unwrap());
    assert_eq!(restored.xp(), org.xp());
    assert_eq!(restored.get(&task).unwrap().elapsed_time, 75);

    // Restoring an older, lower-xp backup replaces records but keeps xp.
    let earned = restored.xp();
    let (empty, _clock) = organizer_at("2025-12-01T09:00:00");
    restored.import(empty.export().unwrap()).unwrap();
    assert!(restored.records().unwrap().is_empty());
    assert_eq!(restored.xp(), earned);
}
