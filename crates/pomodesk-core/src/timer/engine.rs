//! Timer engine implementation.
//!
//! The engine is a single-threaded state machine. It owns no thread and no
//! timer: it records when the next tick is due and the caller is responsible
//! for calling `tick()` about once per second while it is active.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Active --pause--> Idle
//! Active --tick (remaining hits 0)--> switch mode --> Idle | Active (auto-start)
//! any --reset--> Idle in Work
//! ```
//!
//! Leaving an interval through a mode switch, a reset or a shutdown closes the
//! open session and appends it to the [`SessionLog`].
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(&config, SessionLog::open(path));
//! let mut events = engine.subscribe();
//! engine.start();
//! // Once per second while engine.is_running():
//! engine.tick();
//! ```

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::clock::{Clock, SystemClock};
use crate::events::Event;
use crate::storage::{Config, IntervalType, SessionLog, SessionRecord};

/// Countdown state owned by the engine. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub running: bool,
    pub mode: IntervalType,
    /// Start of the interval being timed; `None` when no session is open.
    pub session_start: Option<NaiveDateTime>,
}

/// Durations and flags the engine takes from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSettings {
    pub work_seconds: u64,
    pub break_seconds: u64,
    pub auto_start_next: bool,
    pub sound_enabled: bool,
    pub work_label: String,
    pub break_label: String,
}

impl From<&Config> for TimerSettings {
    fn from(config: &Config) -> Self {
        Self {
            work_seconds: config.work_seconds(),
            break_seconds: config.break_seconds(),
            auto_start_next: config.auto_start_next,
            sound_enabled: config.sound_enabled,
            work_label: config.work_label.clone(),
            break_label: config.break_label.clone(),
        }
    }
}

impl TimerSettings {
    fn duration_of(&self, mode: IntervalType) -> u64 {
        match mode {
            IntervalType::Work => self.work_seconds,
            IntervalType::Break => self.break_seconds,
        }
    }

    fn label_of(&self, mode: IntervalType) -> &str {
        match mode {
            IntervalType::Work => &self.work_label,
            IntervalType::Break => &self.break_label,
        }
    }
}

/// What the shell needs to render the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub remaining_seconds: u64,
    pub mode: IntervalType,
    pub running: bool,
    /// Stopped by `pause()` with the session still open.
    pub paused: bool,
    /// `MM:SS` countdown text.
    pub display: String,
    pub label: String,
}

/// Core timer engine.
#[derive(Debug)]
pub struct TimerEngine {
    settings: TimerSettings,
    state: TimerState,
    paused: bool,
    next_tick: Option<NaiveDateTime>,
    log: SessionLog,
    clock: Box<dyn Clock>,
    subscribers: Vec<UnboundedSender<Event>>,
}

impl TimerEngine {
    /// Create an engine on the system clock.
    ///
    /// Starts `Idle` in Work mode with the full work duration loaded.
    pub fn new(config: &Config, log: SessionLog) -> Self {
        Self::with_clock(config, log, SystemClock)
    }

    pub fn with_clock(config: &Config, log: SessionLog, clock: impl Clock + 'static) -> Self {
        let settings = TimerSettings::from(config);
        let state = TimerState {
            remaining_seconds: settings.work_seconds,
            running: false,
            mode: IntervalType::Work,
            session_start: None,
        };
        Self {
            settings,
            state,
            paused: false,
            next_tick: None,
            log,
            clock: Box::new(clock),
            subscribers: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn mode(&self) -> IntervalType {
        self.state.mode
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.state.remaining_seconds
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn session_log(&self) -> &SessionLog {
        &self.log
    }

    pub fn session_log_mut(&mut self) -> &mut SessionLog {
        &mut self.log
    }

    /// Label configured for the current mode.
    pub fn mode_label(&self) -> &str {
        self.settings.label_of(self.state.mode)
    }

    /// Remaining time as `MM:SS`.
    pub fn display_time(&self) -> String {
        let secs = self.state.remaining_seconds;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// When the pending tick is due; `None` when nothing is scheduled.
    pub fn next_tick_due(&self) -> Option<NaiveDateTime> {
        self.next_tick
    }

    /// Time left until the pending tick, zero if it is already due.
    pub fn time_until_next_tick(&self) -> Option<std::time::Duration> {
        let due = self.next_tick?;
        Some((due - self.clock.now()).to_std().unwrap_or_default())
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            remaining_seconds: self.state.remaining_seconds,
            mode: self.state.mode,
            running: self.state.running,
            paused: self.paused,
            display: self.display_time(),
            label: self.mode_label().to_string(),
        }
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&mut self) -> UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin or resume the countdown. No-op while already running.
    ///
    /// A resumed pause keeps the original session start, so the time spent
    /// paused is part of the logged duration.
    pub fn start(&mut self) -> Option<Event> {
        if self.state.running {
            return None;
        }
        let now = self.clock.now();
        self.state.running = true;
        self.paused = false;
        self.state.session_start.get_or_insert(now);
        self.schedule_tick(now);

        tracing::debug!(mode = %self.state.mode, remaining = self.state.remaining_seconds, "timer started");
        let event = Event::TimerStarted {
            mode: self.state.mode,
            remaining_seconds: self.state.remaining_seconds,
            at: now,
        };
        self.emit(event.clone());
        Some(event)
    }

    /// Stop counting. The session stays open and no time is adjusted.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        self.cancel_tick();
        self.state.running = false;
        self.paused = true;

        tracing::debug!(remaining = self.state.remaining_seconds, "timer paused");
        let event = Event::TimerPaused {
            remaining_seconds: self.state.remaining_seconds,
            at: self.clock.now(),
        };
        self.emit(event.clone());
        Some(event)
    }

    /// Advance the countdown by one second.
    ///
    /// Ignored unless running, so a tick delivered after `pause` or `reset`
    /// cannot act on the new state. Reaching zero switches mode.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.running {
            tracing::trace!("dropping tick while idle");
            return None;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds == 0 {
            return Some(self.switch_mode());
        }

        self.schedule_tick(self.clock.now());
        let event = Event::TimerTicked {
            remaining_seconds: self.state.remaining_seconds,
        };
        self.emit(event.clone());
        Some(event)
    }

    /// Log the current interval and load the other mode.
    ///
    /// With auto-start the new mode starts counting right away; otherwise the
    /// engine waits idle. A fresh session is opened either way.
    pub fn switch_mode(&mut self) -> Event {
        self.close_session();
        self.cancel_tick();

        let from = self.state.mode;
        let to = from.toggled();
        let now = self.clock.now();
        self.state.mode = to;
        self.state.remaining_seconds = self.settings.duration_of(to);
        self.state.session_start = Some(now);
        self.state.running = false;
        self.paused = false;

        tracing::info!(%from, %to, "mode switched");
        let event = Event::ModeSwitched {
            from,
            to,
            remaining_seconds: self.state.remaining_seconds,
            notify: self.settings.sound_enabled,
            at: now,
        };
        self.emit(event.clone());

        if self.settings.auto_start_next {
            self.start();
        }
        event
    }

    /// Log whatever interval is in progress and return to an idle Work
    /// interval. Both Work and Break sessions are logged.
    pub fn reset(&mut self) -> Option<Event> {
        self.close_session();
        self.cancel_tick();
        self.state = TimerState {
            remaining_seconds: self.settings.work_seconds,
            running: false,
            mode: IntervalType::Work,
            session_start: None,
        };
        self.paused = false;

        tracing::debug!("timer reset");
        let event = Event::TimerReset {
            at: self.clock.now(),
        };
        self.emit(event.clone());
        Some(event)
    }

    /// Close the open session, appending it to the log if it lasted at least
    /// one whole second. The session is cleared either way.
    ///
    /// A failed history write is logged; the record stays in memory and the
    /// engine carries on.
    pub fn close_session(&mut self) -> Option<SessionRecord> {
        let start = self.state.session_start.take()?;
        let duration = (self.clock.now() - start).num_seconds();
        if duration <= 0 {
            return None;
        }

        let record = SessionRecord {
            start_timestamp: start,
            interval_type: self.state.mode,
            duration_seconds: duration.unsigned_abs(),
        };
        if let Err(e) = self.log.append(record.clone()) {
            tracing::warn!("session kept in memory only: {e}");
        }
        tracing::info!(kind = %record.interval_type, secs = record.duration_seconds, "session logged");
        self.emit(Event::SessionLogged {
            record: record.clone(),
        });
        Some(record)
    }

    /// Stop for good: cancel the pending tick and log the open session.
    pub fn shutdown(&mut self) -> Option<SessionRecord> {
        self.cancel_tick();
        self.state.running = false;
        self.paused = false;
        self.close_session()
    }

    /// Install new durations, labels and flags.
    ///
    /// An idle engine with no open session reloads the full duration of its
    /// current mode; a running or paused interval keeps its remaining time.
    pub fn apply_config(&mut self, config: &Config) {
        self.settings = TimerSettings::from(config);
        if !self.state.running && self.state.session_start.is_none() {
            self.state.remaining_seconds = self.settings.duration_of(self.state.mode);
        }
        let snapshot = self.snapshot();
        self.broadcast(Event::StateSnapshot(snapshot));
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn schedule_tick(&mut self, now: NaiveDateTime) {
        self.next_tick = Some(now + Duration::seconds(1));
    }

    fn cancel_tick(&mut self) {
        self.next_tick = None;
    }

    /// Send `event` followed by a state snapshot.
    fn emit(&mut self, event: Event) {
        self.broadcast(event);
        let snapshot = self.snapshot();
        self.broadcast(Event::StateSnapshot(snapshot));
    }

    fn broadcast(&mut self, event: Event) {
        if self.subscribers.is_empty() {
            return;
        }
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        clock: ManualClock,
        engine: TimerEngine,
    }

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn fixture(config: Config) -> Fixture {
        let dir = TempDir::new().unwrap();
        let log = SessionLog::open(dir.path().join("history.json"));
        let clock = ManualClock::new(t0());
        let engine = TimerEngine::with_clock(&config, log, clock.clone());
        Fixture {
            _dir: dir,
            clock,
            engine,
        }
    }

    fn one_minute(auto_start_next: bool) -> Config {
        Config {
            work_minutes: 1,
            break_minutes: 2,
            auto_start_next,
            ..Config::default()
        }
    }

    /// One real second passes, then the tick fires.
    fn tick_n(f: &mut Fixture, n: usize) {
        for _ in 0..n {
            f.clock.advance_secs(1);
            f.engine.tick();
        }
    }

    #[test]
    fn starts_idle_in_work() {
        let f = fixture(Config::default());
        let state = f.engine.state();
        assert_eq!(state.remaining_seconds, 25 * 60);
        assert_eq!(state.mode, IntervalType::Work);
        assert!(!state.running);
        assert_eq!(state.session_start, None);
        assert_eq!(f.engine.display_time(), "25:00");
        assert_eq!(f.engine.mode_label(), "WORK");
        assert_eq!(f.engine.next_tick_due(), None);
    }

    #[test]
    fn full_work_interval_switches_to_break_and_logs_once() {
        let mut f = fixture(one_minute(false));
        assert!(f.engine.start().is_some());
        tick_n(&mut f, 60);

        let state = f.engine.state();
        assert_eq!(state.mode, IntervalType::Break);
        assert!(!state.running);
        assert_eq!(state.remaining_seconds, 120);
        assert_eq!(f.engine.next_tick_due(), None);

        let records = f.engine.session_log().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].interval_type, IntervalType::Work);
        assert!((59..=61).contains(&records[0].duration_seconds));
        assert_eq!(records[0].start_timestamp, t0());
    }

    #[test]
    fn auto_start_chains_into_break() {
        let mut f = fixture(one_minute(true));
        f.engine.start();
        tick_n(&mut f, 60);

        assert_eq!(f.engine.mode(), IntervalType::Break);
        assert!(f.engine.is_running());
        assert_eq!(f.engine.remaining_seconds(), 120);
        assert_eq!(f.engine.state().session_start, Some(f.clock.now()));
        assert!(f.engine.next_tick_due().is_some());

        tick_n(&mut f, 120);
        assert_eq!(f.engine.mode(), IntervalType::Work);
        let kinds: Vec<IntervalType> = f
            .engine
            .session_log()
            .records()
            .iter()
            .map(|r| r.interval_type)
            .collect();
        assert_eq!(kinds, vec![IntervalType::Work, IntervalType::Break]);
    }

    #[test]
    fn pause_then_start_keeps_remaining() {
        let mut f = fixture(Config::default());
        f.engine.start();
        tick_n(&mut f, 5);
        let before = f.engine.remaining_seconds();

        assert!(f.engine.pause().is_some());
        assert!(f.engine.is_paused());
        assert!(f.engine.start().is_some());
        assert_eq!(f.engine.remaining_seconds(), before);
        assert_eq!(f.engine.state().session_start, Some(t0()));
    }

    #[test]
    fn start_and_pause_are_idempotent() {
        let mut f = fixture(Config::default());
        assert!(f.engine.pause().is_none());
        assert!(f.engine.start().is_some());
        assert!(f.engine.start().is_none());
        assert!(f.engine.pause().is_some());
        assert!(f.engine.pause().is_none());
    }

    #[test]
    fn paused_time_counts_toward_logged_duration() {
        let mut f = fixture(Config::default());
        f.engine.start();
        tick_n(&mut f, 10);
        f.engine.pause();
        f.clock.advance_secs(50);
        f.engine.start();
        tick_n(&mut f, 10);
        f.engine.reset();

        let records = f.engine.session_log().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration_seconds, 70);
    }

    #[test]
    fn stale_tick_after_pause_is_ignored() {
        let mut f = fixture(Config::default());
        f.engine.start();
        f.engine.pause();
        let before = f.engine.remaining_seconds();
        f.clock.advance_secs(1);
        assert!(f.engine.tick().is_none());
        assert_eq!(f.engine.remaining_seconds(), before);
        assert_eq!(f.engine.next_tick_due(), None);
    }

    #[test]
    fn reset_without_session_logs_nothing() {
        let mut f = fixture(Config::default());
        f.clock.advance_secs(30);
        f.engine.reset();
        assert!(f.engine.session_log().is_empty());
    }

    #[test]
    fn reset_logs_break_sessions_too() {
        let mut f = fixture(one_minute(true));
        f.engine.start();
        tick_n(&mut f, 60 + 30);
        assert_eq!(f.engine.mode(), IntervalType::Break);

        f.engine.reset();
        let records = f.engine.session_log().records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].interval_type, IntervalType::Break);
        assert_eq!(records[1].duration_seconds, 30);

        let state = f.engine.state();
        assert_eq!(state.mode, IntervalType::Work);
        assert_eq!(state.remaining_seconds, 60);
        assert_eq!(state.session_start, None);
        assert!(!state.running);
    }

    #[test]
    fn zero_length_session_is_not_logged_but_cleared() {
        let mut f = fixture(Config::default());
        f.engine.start();
        assert!(f.engine.close_session().is_none());
        assert_eq!(f.engine.state().session_start, None);
        assert!(f.engine.session_log().is_empty());
    }

    #[test]
    fn shutdown_logs_open_session_and_cancels_tick() {
        let mut f = fixture(Config::default());
        f.engine.start();
        tick_n(&mut f, 42);
        let record = f.engine.shutdown().unwrap();
        assert_eq!(record.duration_seconds, 42);
        assert!(!f.engine.is_running());
        assert_eq!(f.engine.next_tick_due(), None);
    }

    #[test]
    fn engine_keeps_running_when_history_cannot_be_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::create_dir_all(path.join("occupied")).unwrap();
        let clock = ManualClock::new(t0());
        let mut engine =
            TimerEngine::with_clock(&one_minute(true), SessionLog::new(&path), clock.clone());

        engine.start();
        for _ in 0..60 {
            clock.advance_secs(1);
            engine.tick();
        }
        assert_eq!(engine.mode(), IntervalType::Break);
        assert!(engine.is_running());
        assert_eq!(engine.session_log().len(), 1);
    }

    #[test]
    fn subscribers_see_transitions_and_snapshots() {
        let mut f = fixture(Config::default());
        let mut rx = f.engine.subscribe();
        f.engine.start();
        f.engine.pause();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], Event::TimerStarted { mode: IntervalType::Work, .. }));
        match &events[1] {
            Event::StateSnapshot(snap) => assert!(snap.running),
            other => panic!("expected snapshot, got {other:?}"),
        }
        assert!(matches!(events[2], Event::TimerPaused { .. }));
        match &events[3] {
            Event::StateSnapshot(snap) => {
                assert!(!snap.running);
                assert!(snap.paused);
                assert_eq!(snap.display, "25:00");
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut f = fixture(Config::default());
        let rx = f.engine.subscribe();
        drop(rx);
        f.engine.start();
        assert!(f.engine.subscribers.is_empty());
    }

    #[test]
    fn mode_switch_event_carries_sound_flag() {
        let config = Config {
            sound_enabled: false,
            ..one_minute(false)
        };
        let mut f = fixture(config);
        f.engine.start();
        tick_n(&mut f, 59);
        let last = {
            f.clock.advance_secs(1);
            f.engine.tick()
        };
        match last {
            Some(Event::ModeSwitched { to, notify, .. }) => {
                assert_eq!(to, IntervalType::Break);
                assert!(!notify);
            }
            other => panic!("expected mode switch, got {other:?}"),
        }
    }

    #[test]
    fn apply_config_reloads_idle_duration_only() {
        let mut f = fixture(Config::default());
        let longer = Config {
            work_minutes: 50,
            work_label: "FOCUS".into(),
            ..Config::default()
        };
        f.engine.apply_config(&longer);
        assert_eq!(f.engine.remaining_seconds(), 50 * 60);
        assert_eq!(f.engine.mode_label(), "FOCUS");

        f.engine.start();
        tick_n(&mut f, 3);
        f.engine.apply_config(&Config::default());
        assert_eq!(f.engine.remaining_seconds(), 50 * 60 - 3);
    }

    #[test]
    fn next_tick_is_one_second_out() {
        let mut f = fixture(Config::default());
        f.engine.start();
        assert_eq!(
            f.engine.next_tick_due(),
            Some(t0() + Duration::seconds(1))
        );
        assert_eq!(
            f.engine.time_until_next_tick(),
            Some(std::time::Duration::from_secs(1))
        );
        f.clock.advance_secs(5);
        assert_eq!(f.engine.time_until_next_tick(), Some(std::time::Duration::ZERO));
    }
}
