use std::time::Duration;

/// Decrementing game clock driven by explicit ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTimer {
    remaining: Duration,
    running: bool,
    expired: bool,
}

impl CountdownTimer {
    /// A stopped timer with nothing on the clock. Call [`start`](Self::start).
    pub fn new() -> Self {
        Self {
            remaining: Duration::ZERO,
            running: false,
            expired: false,
        }
    }

    pub fn start(&mut self, initial: Duration) {
        self.remaining = initial;
        self.running = !initial.is_zero();
        self.expired = initial.is_zero();
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        if !self.expired {
            self.running = true;
        }
    }

    /// Advance by `elapsed`. Returns true exactly once, on the tick that reaches zero.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.running || self.expired {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.running = false;
            self.expired = true;
            return true;
        }
        false
    }

    /// Freeze the clock for good without firing.
    pub fn stop(&mut self) {
        self.running = false;
        self.expired = true;
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_expired(&self) -> bool {
        self.expired
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// `MM:SS` under an hour, `HH:MM:SS` otherwise. Partial seconds round up so
/// the clock only shows `00:00` once it has actually run out.
pub fn format_remaining(d: Duration) -> String {
    let mut total_secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        total_secs += 1;
    }
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
