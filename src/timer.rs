//! Wall-clock countdown.
//!
//! Remaining time is always recomputed from `now - started_at`; nothing is
//! accumulated per tick, so late or skipped evaluations never drift.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerTick {
    pub minutes_remaining: u64,
    pub seconds_remaining: u64,
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
    pub is_complete: bool,
}

impl TimerTick {
    fn from_elapsed(duration_secs: u64, elapsed_seconds: u64) -> Self {
        let remaining_seconds = duration_secs.saturating_sub(elapsed_seconds);
        Self {
            minutes_remaining: remaining_seconds / 60,
            seconds_remaining: remaining_seconds % 60,
            elapsed_seconds,
            remaining_seconds,
            is_complete: remaining_seconds == 0,
        }
    }

    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_seconds as f64 / 60.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub tick: TimerTick,
    /// Set on the single evaluation that observed the countdown reach zero.
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    NotIdle(TimerState),
    NotRunning(TimerState),
    InvalidDuration,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::NotIdle(state) => write!(f, "timer cannot start while {state:?}"),
            TimerError::NotRunning(state) => write!(f, "timer cannot stop while {state:?}"),
            TimerError::InvalidDuration => write!(f, "timer duration must be a positive number of minutes"),
        }
    }
}

impl std::error::Error for TimerError {}

#[derive(Debug, Clone)]
pub struct CountdownTimer {
    state: TimerState,
    started_at: Option<DateTime<Utc>>,
    duration_secs: u64,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            started_at: None,
            duration_secs: 0,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn start(&mut self, minutes: f64, now: DateTime<Utc>) -> Result<(), TimerError> {
        if self.state != TimerState::Idle {
            return Err(TimerError::NotIdle(self.state));
        }
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(TimerError::InvalidDuration);
        }
        let duration_secs = (minutes * 60.0).round() as u64;
        if duration_secs == 0 {
            return Err(TimerError::InvalidDuration);
        }

        self.started_at = Some(now);
        self.duration_secs = duration_secs;
        self.state = TimerState::Running;
        Ok(())
    }

    /// Re-derives the countdown from the wall clock. Returns `None` unless
    /// running; the evaluation that reaches zero moves to `Completed`, so
    /// completion is reported once.
    pub fn evaluate(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        if self.state != TimerState::Running {
            return None;
        }

        let tick = TimerTick::from_elapsed(self.duration_secs, self.elapsed_seconds(now));
        let completed = tick.is_complete;
        if completed {
            self.state = TimerState::Completed;
        }
        Some(TimerEvent { tick, completed })
    }

    pub fn stop(&mut self) -> Result<(), TimerError> {
        if self.state != TimerState::Running {
            return Err(TimerError::NotRunning(self.state));
        }
        self.state = TimerState::Idle;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.started_at = None;
        self.duration_secs = 0;
    }

    /// Display value for any state, without transitioning.
    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerTick {
        match self.state {
            TimerState::Idle => TimerTick {
                is_complete: false,
                ..TimerTick::from_elapsed(self.duration_secs, 0)
            },
            TimerState::Running => TimerTick::from_elapsed(self.duration_secs, self.elapsed_seconds(now)),
            TimerState::Completed => TimerTick::from_elapsed(self.duration_secs, self.duration_secs),
        }
    }

    fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let millis = (now - started_at).num_milliseconds().max(0);
        ((millis / 1000) as u64).min(self.duration_secs)
    }
}
