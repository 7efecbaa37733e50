//! Periodic refresh scheduling.
//!
//! A single cadence drives health checks and the status fan-out. The
//! poller itself owns no timer; the application loop asks
//! [`Poller::should_poll`] each iteration. Ticks are skipped entirely
//! while the terminal is unfocused, and the reason polling is paused is
//! tracked as two separate bits: regaining focus resumes a background
//! pause but never overrides an explicit stop.

use std::time::{Duration, Instant};

/// Fixed refresh cadence.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Interval-based poll gate.
#[derive(Debug)]
pub struct Poller {
    interval: Duration,
    running: bool,
    backgrounded: bool,
    last_tick: Option<Instant>,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: false,
            backgrounded: false,
            last_tick: None,
        }
    }

    /// Start polling. A no-op when already running; returns whether the
    /// call changed anything. The first tick after a fresh start fires
    /// immediately.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.last_tick = None;
        true
    }

    /// Stop polling explicitly. Focus changes will not resume it.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Record a focus change. Losing focus pauses ticks; regaining it
    /// resumes a running poller with an immediate tick. An explicitly
    /// stopped poller stays stopped.
    pub fn set_backgrounded(&mut self, backgrounded: bool) {
        if self.backgrounded && !backgrounded && self.running {
            self.last_tick = None;
        }
        self.backgrounded = backgrounded;
    }

    /// Whether refresh is effectively active.
    pub fn is_polling(&self) -> bool {
        self.running && !self.backgrounded
    }

    /// Whether a tick is due at `now`. Advances the deadline when it is.
    pub fn should_poll(&mut self, now: Instant) -> bool {
        if !self.running || self.backgrounded {
            return false;
        }
        let due = match self.last_tick {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        };
        if due {
            self.last_tick = Some(now);
        }
        due
    }
}
