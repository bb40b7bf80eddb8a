//! Integration tests for the widget lifecycle.
//!
//! Drives a full Work -> Break -> Work cycle through the public API with a
//! manual clock and checks what lands on disk.

use chrono::NaiveDate;
use pomodesk_core::{
    Config, ConfigStore, DataPaths, Event, IntervalType, ManualClock, SessionLog, Widget,
};
use tempfile::TempDir;

fn clock() -> ManualClock {
    ManualClock::new(
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
    )
}

fn run_seconds(widget: &mut Widget, clock: &ManualClock, seconds: u64) {
    for _ in 0..seconds {
        clock.advance_secs(1);
        widget.engine_mut().tick();
    }
}

fn short_config(widget: &Widget, auto_start: bool) -> Config {
    Config {
        work_minutes: 1,
        break_minutes: 1,
        auto_start_next: auto_start,
        ..widget.config().clone()
    }
}

#[test]
fn test_full_cycle_with_auto_start() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::in_dir(dir.path());
    let clock = clock();
    let mut widget = Widget::open_with_clock(paths.clone(), clock.clone());
    widget.update_config(short_config(&widget, true)).unwrap();

    widget.engine_mut().start();
    run_seconds(&mut widget, &clock, 60);
    assert_eq!(widget.engine().mode(), IntervalType::Break);
    assert!(widget.engine().is_running());
    assert_eq!(widget.engine().remaining_seconds(), 60);

    run_seconds(&mut widget, &clock, 60);
    assert_eq!(widget.engine().mode(), IntervalType::Work);
    assert!(widget.engine().is_running());

    run_seconds(&mut widget, &clock, 10);
    widget.shutdown(None);
    drop(widget);

    let log = SessionLog::open(&paths.history_file);
    let kinds: Vec<_> = log.records().iter().map(|r| r.interval_type).collect();
    assert_eq!(
        kinds,
        vec![IntervalType::Work, IntervalType::Break, IntervalType::Work]
    );
    let durations: Vec<_> = log.records().iter().map(|r| r.duration_seconds).collect();
    assert_eq!(durations, vec![60, 60, 10]);

    let stats = log.aggregate();
    assert_eq!(stats.total_sessions, 3);
    assert_eq!(stats.total_work_seconds, 70);
    assert_eq!(stats.total_break_seconds, 60);
}

#[test]
fn test_switch_without_auto_start_waits_idle() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let mut widget = Widget::open_with_clock(DataPaths::in_dir(dir.path()), clock.clone());
    widget.update_config(short_config(&widget, false)).unwrap();

    widget.engine_mut().start();
    run_seconds(&mut widget, &clock, 60);
    assert_eq!(widget.engine().mode(), IntervalType::Break);
    assert!(!widget.engine().is_running());
    assert_eq!(widget.engine().display_time(), "01:00");

    // Further ticks do nothing until the user starts the break.
    run_seconds(&mut widget, &clock, 5);
    assert_eq!(widget.engine().remaining_seconds(), 60);
    assert_eq!(widget.session_log().len(), 1);
}

#[test]
fn test_pause_resume_and_reset_log_one_session() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::in_dir(dir.path());
    let clock = clock();
    let mut widget = Widget::open_with_clock(paths.clone(), clock.clone());

    widget.engine_mut().start();
    run_seconds(&mut widget, &clock, 30);
    widget.engine_mut().pause();
    clock.advance_secs(20);
    assert_eq!(widget.engine().remaining_seconds(), 25 * 60 - 30);

    widget.engine_mut().start();
    run_seconds(&mut widget, &clock, 10);
    widget.engine_mut().reset();
    assert_eq!(widget.engine().remaining_seconds(), 25 * 60);
    assert!(!widget.engine().is_paused());

    let log = SessionLog::open(&paths.history_file);
    assert_eq!(log.len(), 1);
    assert_eq!(log.records()[0].duration_seconds, 60);

    // Nothing is open after reset, so shutdown adds nothing.
    assert!(widget.shutdown(None).is_none());
}

#[test]
fn test_subscriber_sees_mode_switch_and_session() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let mut widget = Widget::open_with_clock(DataPaths::in_dir(dir.path()), clock.clone());
    widget.update_config(short_config(&widget, false)).unwrap();
    let mut rx = widget.engine_mut().subscribe();

    widget.engine_mut().start();
    run_seconds(&mut widget, &clock, 60);

    let mut saw_logged = false;
    let mut saw_switch = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            Event::SessionLogged { record } => {
                assert_eq!(record.interval_type, IntervalType::Work);
                saw_logged = true;
            }
            Event::ModeSwitched { from, to, notify, .. } => {
                assert!(saw_logged, "session is logged before the switch");
                assert_eq!((from, to), (IntervalType::Work, IntervalType::Break));
                assert!(notify);
                saw_switch = true;
            }
            _ => {}
        }
    }
    assert!(saw_switch);
}

#[test]
fn test_settings_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::in_dir(dir.path());
    {
        let mut widget = Widget::open_with_clock(paths.clone(), clock());
        let config = Config {
            work_minutes: 50,
            theme_key: "light".into(),
            ..widget.config().clone()
        };
        widget.update_config(config).unwrap();
    }

    let stored = ConfigStore::new(&paths.config_file).load();
    assert_eq!(stored.work_minutes, 50);

    let widget = Widget::open_with_clock(paths, clock());
    assert_eq!(widget.engine().remaining_seconds(), 50 * 60);
    assert_eq!(widget.theme().key, "light");
}
