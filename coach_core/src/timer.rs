//! Rest countdown timer.
//!
//! The timer has one-second resolution and is driven by the host: an event
//! loop calls [`CountdownTimer::tick`] once per elapsed second (or
//! [`CountdownTimer::advance`] with a measured number of seconds). Nothing in
//! here spawns threads or sleeps.
//!
//! States: `Idle → Running → {Paused ↔ Running} → Completed`, with `reset()`
//! returning to `Idle` from anywhere.

use std::fmt;

/// Lifecycle state of a countdown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Result of a single tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer was not running; nothing changed
    Inactive,
    /// One second was consumed
    Counting { remaining: u32 },
    /// This tick reached zero and fired the completion callback
    Completed,
}

type Callback = Box<dyn FnMut()>;

/// Single-purpose interval countdown used between exercises
pub struct CountdownTimer {
    duration: u32,
    remaining: u32,
    state: TimerState,
    on_complete: Option<Callback>,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("duration", &self.duration)
            .field("remaining", &self.remaining)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CountdownTimer {
    /// Create an idle timer with no duration
    pub fn new() -> Self {
        Self {
            duration: 0,
            remaining: 0,
            state: TimerState::Idle,
            on_complete: None,
        }
    }

    /// Start a countdown, replacing whatever was running before.
    ///
    /// A zero duration completes immediately.
    pub fn start<F>(&mut self, duration_seconds: u32, on_complete: F)
    where
        F: FnMut() + 'static,
    {
        if self.state == TimerState::Running || self.state == TimerState::Paused {
            tracing::debug!(
                "Replacing active countdown with {} seconds left",
                self.remaining
            );
        }

        self.duration = duration_seconds;
        self.remaining = duration_seconds;
        self.on_complete = Some(Box::new(on_complete));
        self.state = TimerState::Running;

        if duration_seconds == 0 {
            self.finish();
        }
    }

    /// Consume one second of a running countdown
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Inactive;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.finish();
            TickOutcome::Completed
        } else {
            TickOutcome::Counting {
                remaining: self.remaining,
            }
        }
    }

    /// Tick up to `seconds` times, stopping early once the countdown
    /// completes or stops running. Returns true if this call completed it.
    pub fn advance(&mut self, seconds: u32) -> bool {
        for _ in 0..seconds {
            match self.tick() {
                TickOutcome::Completed => return true,
                TickOutcome::Inactive => return false,
                TickOutcome::Counting { .. } => {}
            }
        }
        false
    }

    /// Pause a running countdown. No-op in any other state.
    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    /// Resume a paused countdown, or restart an idle one that has a duration.
    pub fn resume(&mut self) {
        match self.state {
            TimerState::Paused => self.state = TimerState::Running,
            TimerState::Idle if self.duration > 0 => {
                self.remaining = self.duration;
                self.state = TimerState::Running;
            }
            _ => {}
        }
    }

    /// Return to idle with the full duration restored
    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.state = TimerState::Idle;
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Fraction of the duration already elapsed, in [0, 1]
    pub fn elapsed_fraction(&self) -> f64 {
        if self.duration == 0 {
            return if self.state == TimerState::Completed { 1.0 } else { 0.0 };
        }
        f64::from(self.duration - self.remaining) / f64::from(self.duration)
    }

    /// Remaining time as `m:ss`
    pub fn display(&self) -> String {
        format_clock(self.remaining)
    }

    fn finish(&mut self) {
        self.remaining = 0;
        self.state = TimerState::Completed;
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
    }
}

/// Format seconds as `m:ss` with the seconds zero-padded
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
