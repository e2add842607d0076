//! Run timer
//!
//! Counts whole seconds of a run while it is running. The browser calls `tick`
//! every `RUN_TIMER_TICK_MS`; the elapsed time becomes a personal record's `time`.

use crate::ranking::format_time;

/// Start/pause/reset stopwatch in whole seconds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTimer {
    elapsed_seconds: u64,
    running: bool,
}

impl RunTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if already running
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        log::debug!("Run timer started at {}", self.display());
        true
    }

    /// Returns false if not running
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        log::debug!("Run timer paused at {}", self.display());
        true
    }

    /// Stop and zero
    pub fn reset(&mut self) {
        self.pause();
        self.elapsed_seconds = 0;
    }

    /// Count one second. `None` while paused.
    pub fn tick(&mut self) -> Option<u64> {
        if !self.running {
            return None;
        }
        self.elapsed_seconds += 1;
        Some(self.elapsed_seconds)
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// `HH:MM:SS`
    pub fn display(&self) -> String {
        format_time(self.elapsed_seconds)
    }
}
