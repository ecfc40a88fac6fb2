use std::time::{Duration, Instant};

/// A pausable stopwatch.
///
/// The timer never reads the system clock itself; every operation takes the
/// current instant from the caller.
#[derive(Clone, Debug, Default)]
pub struct Timer {
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)starts the timer from zero.
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.paused_at = None;
        self.paused_total = Duration::ZERO;
    }

    /// Has no effect if the timer isn't started or is already paused.
    pub fn pause(&mut self, now: Instant) {
        if self.started_at.is_some() && self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Has no effect if the timer isn't paused.
    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
    }

    /// Returns the timer to its unstarted state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Time spent running, excluding pauses. Zero if never started.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let until = self.paused_at.unwrap_or(now);
        until
            .saturating_duration_since(started_at)
            .saturating_sub(self.paused_total)
    }
}

/// Whole seconds, rounded up, so that only an exhausted duration shows as 0.
pub fn ceil_secs(duration: Duration) -> u32 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}
