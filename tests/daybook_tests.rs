//! Daybook facade tests: streaks across days, target config and backups

use chrono::{Days, NaiveDate};
use daybook::{Clock, Daybook, FixedClock, StoreConfig, StoreError};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Clock the test can move forward between commits.
struct StepClock(Mutex<NaiveDate>);

impl StepClock {
    fn new(start: NaiveDate) -> Arc<Self> {
        Arc::new(Self(Mutex::new(start)))
    }

    fn advance(&self, days: u64) {
        let mut today = self.0.lock().unwrap();
        *today = today.checked_add_days(Days::new(days)).unwrap();
    }
}

impl Clock for StepClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap()
    }
}

#[test]
fn test_streak_grows_and_survives_gap() {
    let temp_dir = TempDir::new().unwrap();
    let clock = StepClock::new(date(2024, 4, 1));
    let mut book =
        Daybook::open_with_clock(StoreConfig::new(temp_dir.path()), clock.clone()).unwrap();

    for _ in 0..3 {
        let today = book.today();
        book.schedule(today, 9, "study").unwrap();
        clock.advance(1);
    }
    assert_eq!(book.max_continuous_days(), 3);

    // Skip a day, then study once more.
    clock.advance(1);
    let today = book.today();
    book.schedule(today, 9, "study").unwrap();

    assert_eq!(book.current_streak(), 1);
    assert_eq!(book.max_continuous_days(), 3);

    drop(book);
    let reopened =
        Daybook::open_with_clock(StoreConfig::new(temp_dir.path()), clock.clone()).unwrap();
    assert_eq!(reopened.max_continuous_days(), 3);
}

#[test]
fn test_daily_log_holds_only_today() {
    let temp_dir = TempDir::new().unwrap();
    let clock = StepClock::new(date(2024, 4, 1));
    let mut book =
        Daybook::open_with_clock(StoreConfig::new(temp_dir.path()), clock.clone()).unwrap();

    book.schedule(date(2024, 4, 1), 9, "study").unwrap();
    clock.advance(1);
    book.schedule(date(2024, 4, 2), 10, "meal").unwrap();

    let log = fs::read_to_string(temp_dir.path().join("logs").join("2024-04-02.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&log).unwrap();
    let days = value["studyData"].as_object().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days["2024-04-02"]["timeAxisData"]["10"]["type"], "meal");
    assert_eq!(days["2024-04-02"]["timeAxisData"]["10"]["isCompleted"], true);
}

#[test]
fn test_mutations_keep_counters_in_step() {
    let temp_dir = TempDir::new().unwrap();
    let today = date(2024, 5, 5);
    let mut book = Daybook::open_with_clock(
        StoreConfig::new(temp_dir.path()),
        Arc::new(FixedClock(today)),
    )
    .unwrap();

    book.schedule(today, 9, "study").unwrap();
    book.schedule(today, 10, "study").unwrap();
    book.schedule(today, 12, "meal").unwrap();
    assert!(book.set_completed(today, 10, false).unwrap());
    assert!(!book.set_completed(today, 20, true).unwrap());

    let record = book.peek(today).unwrap();
    assert_eq!(record.study_hours, 1);
    assert_eq!(record.completed_count, 2);
    assert_eq!(record.total_count, 3);

    book.clear_hour(today, 9).unwrap();
    assert_eq!(book.peek(today).unwrap().study_hours, 0);

    let err = book.schedule(today, 24, "study").unwrap_err();
    assert!(matches!(err, StoreError::InvalidHour(24)));

    book.clear_day(today).unwrap();
    assert!(book.peek(today).unwrap().timeline.is_empty());
}

#[test]
fn test_out_of_range_target_clamps_on_open() {
    for stored in ["0", "12", "-1"] {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("study_config.json"),
            format!("{{\"studyTargetHour\": {}}}", stored),
        )
        .unwrap();

        let book = Daybook::open(StoreConfig::new(temp_dir.path())).unwrap();
        assert_eq!(book.target_hours(), 4, "stored value {}", stored);
    }
}

#[test]
fn test_set_target_hours_validates_and_persists() {
    let temp_dir = TempDir::new().unwrap();
    let mut book = Daybook::open(StoreConfig::new(temp_dir.path())).unwrap();

    book.set_target_hours(6).unwrap();
    assert!(matches!(
        book.set_target_hours(9),
        Err(StoreError::ValidationError(_))
    ));
    assert_eq!(book.target_hours(), 6);

    drop(book);
    let reopened = Daybook::open(StoreConfig::new(temp_dir.path())).unwrap();
    assert_eq!(reopened.target_hours(), 6);
}

#[test]
fn test_backup_and_restore_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let today = date(2024, 7, 1);
    let clock = Arc::new(FixedClock(today));
    let mut book =
        Daybook::open_with_clock(StoreConfig::new(temp_dir.path()), clock.clone()).unwrap();

    book.schedule(today, 9, "study").unwrap();
    let export = temp_dir.path().join("export.json");
    book.create_backup(&export).unwrap();
    let saved = book.records().clone();

    book.schedule(today, 14, "study").unwrap();
    book.schedule(date(2024, 6, 30), 9, "study").unwrap();
    assert_ne!(book.records(), &saved);

    let days = book.restore_from_backup(&export).unwrap();
    assert_eq!(days, 1);
    assert_eq!(book.records(), &saved);
    let safety = book.safety_backup_path().unwrap();
    assert_eq!(safety, temp_dir.path().join("study_data.json.restore.bak"));
    assert!(safety.exists());

    drop(book);
    let reopened = Daybook::open_with_clock(StoreConfig::new(temp_dir.path()), clock).unwrap();
    assert_eq!(reopened.records(), &saved);
}

#[test]
fn test_restore_without_safety_backup() {
    let temp_dir = TempDir::new().unwrap();
    let today = date(2024, 7, 1);
    let mut book = Daybook::open_with_clock(
        StoreConfig::new(temp_dir.path()).restore_safety_backup(false),
        Arc::new(FixedClock(today)),
    )
    .unwrap();
    assert!(book.safety_backup_path().is_none());

    book.schedule(today, 9, "study").unwrap();
    let export = temp_dir.path().join("export.json");
    book.create_backup(&export).unwrap();
    book.clear_day(today).unwrap();

    assert_eq!(book.restore_from_backup(&export).unwrap(), 1);
    assert_eq!(book.peek(today).unwrap().study_hours, 1);
    assert!(!temp_dir.path().join("study_data.json.restore.bak").exists());
}

#[test]
fn test_restore_from_corrupt_backup_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let today = date(2024, 7, 1);
    let mut book = Daybook::open_with_clock(
        StoreConfig::new(temp_dir.path()),
        Arc::new(FixedClock(today)),
    )
    .unwrap();
    book.schedule(today, 9, "study").unwrap();
    let before = book.records().clone();

    let broken = temp_dir.path().join("broken.json");
    fs::write(&broken, b"not json").unwrap();
    assert!(matches!(
        book.restore_from_backup(&broken),
        Err(StoreError::ParseError(_))
    ));
    assert!(matches!(
        book.restore_from_backup(&temp_dir.path().join("missing.json")),
        Err(StoreError::NotFound(_))
    ));
    assert_eq!(book.records(), &before);
}

#[test]
fn test_shutdown_flushes_state() {
    let temp_dir = TempDir::new().unwrap();
    let today = date(2024, 8, 8);
    let clock = Arc::new(FixedClock(today));
    let mut book =
        Daybook::open_with_clock(StoreConfig::new(temp_dir.path()), clock.clone()).unwrap();

    book.day(today).study_hours = 5;
    book.shutdown();

    let reopened = Daybook::open_with_clock(StoreConfig::new(temp_dir.path()), clock).unwrap();
    assert_eq!(reopened.peek(today).unwrap().study_hours, 5);
    assert!(temp_dir.path().join("study_config.json").exists());
}

#[test]
fn test_recent_and_stats() {
    let temp_dir = TempDir::new().unwrap();
    let today = date(2024, 9, 3);
    let mut book = Daybook::open_with_clock(
        StoreConfig::new(temp_dir.path()),
        Arc::new(FixedClock(today)),
    )
    .unwrap();

    book.schedule(date(2024, 9, 1), 9, "study").unwrap();
    book.schedule(today, 9, "study").unwrap();
    book.schedule(today, 10, "study").unwrap();

    let recent = book.recent(3);
    let dates: Vec<NaiveDate> = recent.iter().map(|(d, _)| *d).collect();
    assert_eq!(dates, vec![today, date(2024, 9, 1)]);

    let stats = book.stats();
    assert_eq!(stats.total_study_days, 2);
    assert_eq!(stats.total_study_hours, 3);
    assert_eq!(book.current_streak(), 1);
}
