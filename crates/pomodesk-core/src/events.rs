use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::storage::{IntervalType, SessionRecord};
use crate::timer::TimerSnapshot;

/// Every state change of the timer produces an Event.
/// The shell subscribes to them and renders; it is their only consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: IntervalType,
        remaining_seconds: u64,
        at: NaiveDateTime,
    },
    TimerPaused {
        remaining_seconds: u64,
        at: NaiveDateTime,
    },
    TimerTicked {
        remaining_seconds: u64,
    },
    /// The countdown ran out and the other mode is now loaded.
    /// `notify` mirrors the sound setting so the shell knows whether to ring.
    ModeSwitched {
        from: IntervalType,
        to: IntervalType,
        remaining_seconds: u64,
        notify: bool,
        at: NaiveDateTime,
    },
    TimerReset {
        at: NaiveDateTime,
    },
    SessionLogged {
        record: SessionRecord,
    },
    /// Sent after every transition.
    StateSnapshot(TimerSnapshot),
}
