use std::time::{Duration, Instant};

use crate::{GameConfig, RobotConfig, TeamConfig, Timer};

/// Operating time rules shared by all robots.
#[derive(Clone, Copy, Debug)]
pub struct OperatingRules {
    /// `None` means unlimited operating time.
    pub budget: Option<Duration>,
    pub charging_time: Duration,
    pub charging_amount: Duration,
}

impl OperatingRules {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            budget: config.robot_time.map(|s| Duration::from_secs(s.into())),
            charging_time: Duration::from_secs(config.charging_time.into()),
            charging_amount: Duration::from_secs(config.charging_amount.into()),
        }
    }
}

/// A team and its single robot, during one game.
#[derive(Clone, Debug)]
pub struct Team {
    pub name: String,
    pub robot_id: u32,
    pub robot_name: String,
    pub color: String,
    pub basket: String,
    pub zone: Option<String>,
    pub score: i32,
    rules: OperatingRules,
    /// Counts down the robot's operating time.
    operating: Timer,
    /// Operating time earned by charging.
    bonus: Duration,
    charging: bool,
    charging_timer: Timer,
    /// Charging intervals already paid out in the current session.
    charges_paid: u32,
}

impl Team {
    pub fn new(config: &TeamConfig, robot: &RobotConfig, rules: OperatingRules) -> Self {
        Self {
            name: config.name.clone(),
            robot_id: config.robot,
            robot_name: robot.name.clone(),
            color: config.color.clone(),
            basket: config.basket.clone(),
            zone: config.zone.clone(),
            score: 0,
            rules,
            operating: Timer::new(),
            bonus: Duration::ZERO,
            charging: false,
            charging_timer: Timer::new(),
            charges_paid: 0,
        }
    }

    /// Clears the score and charging state and restarts the operating clock.
    pub fn reset(&mut self, now: Instant) {
        self.score = 0;
        self.bonus = Duration::ZERO;
        self.stop_charging();
        self.operating.start(now);
    }

    pub fn pause(&mut self, now: Instant) {
        self.operating.pause(now);
        self.charging_timer.pause(now);
    }

    pub fn resume(&mut self, now: Instant) {
        self.operating.resume(now);
        self.charging_timer.resume(now);
    }

    /// Remaining operating time, or `None` if it is unlimited.
    pub fn fuel(&self, now: Instant) -> Option<Duration> {
        self.rules
            .budget
            .map(|budget| (budget + self.bonus).saturating_sub(self.operating.elapsed(now)))
    }

    pub fn has_fuel(&self, now: Instant) -> bool {
        self.fuel(now).map_or(true, |fuel| !fuel.is_zero())
    }

    pub fn is_charging(&self) -> bool {
        self.charging
    }

    /// Begins or continues a charging session.
    ///
    /// Every full charging time the robot has spent on its station earns the
    /// configured amount of operating time, once, however far apart the
    /// calls are.
    pub fn charge(&mut self, now: Instant) {
        if !self.charging {
            self.charging = true;
            self.charges_paid = 0;
            self.charging_timer.start(now);
            return;
        }
        let completed = self.completed_charges(now);
        if completed > self.charges_paid {
            let earned = completed - self.charges_paid;
            self.bonus += self.rules.charging_amount.saturating_mul(earned);
            self.charges_paid = completed;
        }
    }

    pub fn stop_charging(&mut self) {
        self.charging = false;
        self.charges_paid = 0;
        self.charging_timer.reset();
    }

    /// Time until the next charge is earned, if the robot is charging.
    pub fn charging_time_left(&self, now: Instant) -> Option<Duration> {
        self.charging.then(|| {
            self.rules
                .charging_time
                .checked_mul(self.charges_paid.saturating_add(1))
                .unwrap_or(Duration::MAX)
                .saturating_sub(self.charging_timer.elapsed(now))
        })
    }

    fn completed_charges(&self, now: Instant) -> u32 {
        let interval = self.rules.charging_time.as_nanos();
        if interval == 0 {
            return 0;
        }
        let completed = self.charging_timer.elapsed(now).as_nanos() / interval;
        u32::try_from(completed).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn team(budget: Option<u64>) -> Team {
        let config = TeamConfig {
            name: String::from("team1"),
            robot: 12,
            color: String::from("red"),
            basket: String::from("red_basket"),
            zone: None,
        };
        let robot = RobotConfig {
            name: String::from("Rover"),
        };
        let rules = OperatingRules {
            budget: budget.map(secs),
            charging_time: secs(5),
            charging_amount: secs(10),
        };
        Team::new(&config, &robot, rules)
    }

    #[test]
    fn fuel_runs_out() {
        let t0 = Instant::now();
        let mut team = team(Some(30));
        assert_eq!(team.fuel(t0), Some(secs(30)));
        team.reset(t0);
        assert_eq!(team.fuel(t0 + secs(12)), Some(secs(18)));
        assert!(team.has_fuel(t0 + secs(29)));
        assert!(!team.has_fuel(t0 + secs(30)));
        assert_eq!(team.fuel(t0 + secs(100)), Some(Duration::ZERO));
    }

    #[test]
    fn unlimited_budget_never_runs_out() {
        let t0 = Instant::now();
        let mut team = team(None);
        team.reset(t0);
        assert_eq!(team.fuel(t0 + secs(10_000)), None);
        assert!(team.has_fuel(t0 + secs(10_000)));
    }

    #[test]
    fn charging_earns_operating_time() {
        let t0 = Instant::now();
        let mut team = team(Some(30));
        team.reset(t0);
        team.charge(t0 + secs(10));
        assert!(team.is_charging());
        assert_eq!(team.charging_time_left(t0 + secs(12)), Some(secs(3)));
        // Not long enough yet
        team.charge(t0 + secs(14));
        assert_eq!(team.fuel(t0 + secs(14)), Some(secs(16)));
        team.charge(t0 + secs(15));
        assert_eq!(team.fuel(t0 + secs(15)), Some(secs(25)));
        assert_eq!(team.charging_time_left(t0 + secs(15)), Some(secs(5)));

        team.stop_charging();
        assert!(!team.is_charging());
        assert_eq!(team.charging_time_left(t0 + secs(16)), None);
    }

    #[test]
    fn sparse_calls_pay_every_completed_interval() {
        let t0 = Instant::now();
        let mut team = team(Some(30));
        team.reset(t0);
        team.charge(t0);
        // Three full intervals of five seconds, with two seconds left over
        team.charge(t0 + secs(17));
        assert_eq!(team.fuel(t0 + secs(17)), Some(secs(43)));
        assert_eq!(team.charging_time_left(t0 + secs(17)), Some(secs(3)));
        // The left over time counts towards the fourth interval
        team.charge(t0 + secs(20));
        assert_eq!(team.fuel(t0 + secs(20)), Some(secs(50)));
        // Nothing is paid twice
        team.charge(t0 + secs(21));
        assert_eq!(team.fuel(t0 + secs(21)), Some(secs(49)));
    }

    #[test]
    fn reset_clears_bonus_and_charging() {
        let t0 = Instant::now();
        let mut team = team(Some(30));
        team.reset(t0);
        team.score = 40;
        team.charge(t0);
        team.charge(t0 + secs(5));
        team.reset(t0 + secs(6));
        assert_eq!(team.score, 0);
        assert!(!team.is_charging());
        assert_eq!(team.fuel(t0 + secs(6)), Some(secs(30)));
    }

    #[test]
    fn pause_freezes_fuel() {
        let t0 = Instant::now();
        let mut team = team(Some(30));
        team.reset(t0);
        team.pause(t0 + secs(5));
        assert_eq!(team.fuel(t0 + secs(50)), Some(secs(25)));
        team.resume(t0 + secs(50));
        assert_eq!(team.fuel(t0 + secs(55)), Some(secs(20)));
    }
}
