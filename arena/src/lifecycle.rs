use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{ceil_secs, IllegalTransition, Timer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Set up, but never started.
    Idle,
    Running,
    Paused,
    /// Stopped or out of time. Only `start` leaves this phase.
    Ended,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// A lifecycle command issued by the game operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Stop,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Command::Start => "start",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Stop => "stop",
        };
        f.write_str(s)
    }
}

/// The game's phase and countdown.
///
/// `time_left` is recomputed by [`Self::update()`] and by the commands that
/// stop the countdown, and stays frozen while paused or ended.
#[derive(Clone, Debug)]
pub struct GameClock {
    phase: Phase,
    duration: Duration,
    timer: Timer,
    time_left: u32,
}

impl GameClock {
    pub fn new(game_time: u32) -> Self {
        Self {
            phase: Phase::Idle,
            duration: Duration::from_secs(game_time.into()),
            timer: Timer::new(),
            time_left: game_time,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Whole seconds left, as of the last update.
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Allowed in every phase.
    pub fn start(&mut self, now: Instant) {
        self.timer.start(now);
        self.time_left = ceil_secs(self.duration);
        self.phase = Phase::Running;
    }

    pub fn pause(&mut self, now: Instant) -> Result<(), IllegalTransition> {
        self.check(Command::Pause, &[Phase::Running])?;
        self.refresh(now);
        self.timer.pause(now);
        self.phase = Phase::Paused;
        Ok(())
    }

    pub fn resume(&mut self, now: Instant) -> Result<(), IllegalTransition> {
        self.check(Command::Resume, &[Phase::Paused])?;
        self.timer.resume(now);
        self.phase = Phase::Running;
        Ok(())
    }

    pub fn stop(&mut self, now: Instant) -> Result<(), IllegalTransition> {
        self.check(Command::Stop, &[Phase::Running, Phase::Paused])?;
        self.refresh(now);
        self.timer.pause(now);
        self.phase = Phase::Ended;
        Ok(())
    }

    /// Recomputes the time left, and ends the game once it reaches zero.
    ///
    /// Returns true if the game ran out of time in this call.
    pub fn update(&mut self, now: Instant) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        if self.refresh(now).is_zero() {
            self.timer.pause(now);
            self.phase = Phase::Ended;
            return true;
        }
        false
    }

    /// Sets `time_left` from the timer and returns the exact remaining time.
    fn refresh(&mut self, now: Instant) -> Duration {
        let remaining = self.duration.saturating_sub(self.timer.elapsed(now));
        self.time_left = ceil_secs(remaining);
        remaining
    }

    fn check(&self, command: Command, allowed: &[Phase]) -> Result<(), IllegalTransition> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(IllegalTransition {
                command,
                phase: self.phase,
            })
        }
    }
}
