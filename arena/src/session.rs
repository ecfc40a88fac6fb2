use std::collections::BTreeMap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::info;

use crate::{
    ceil_secs, tag_hive_zones, Candidate, ChargingArbiter, ChargingEvent, ExternalIds, FieldsView,
    GameClock, GameConfig, IllegalTransition, ObjectView, OperatingRules, Phase, PlayingField,
    RobotView, ScoringRule, SetupError, Snapshot, StateDocument, Team, TeamView, Zone,
};

/// The tag for hives first seen outside every team zone, if the
/// configuration names no neutral zone.
pub const NEUTRAL: &str = "neutral";

/// The authoritative state of one match.
///
/// A session is driven by its owner: lifecycle commands and snapshots are
/// applied one at a time, each with the instant it happens at, and
/// [`Self::state()`] publishes the result of the latest one.
pub struct GameSession<R = StdRng> {
    config: GameConfig,
    field: PlayingField,
    teams: Vec<Team>,
    /// `baskets[k]` belongs to `teams[k]`.
    baskets: Vec<Zone>,
    /// Team zones in team order, for tagging hives.
    team_zones: Vec<Zone>,
    clock: GameClock,
    arbiter: ChargingArbiter,
    last_healthy: Vec<i32>,
    hive_zones: BTreeMap<String, String>,
    external_ids: ExternalIds,
    snapshot: Snapshot,
    observed_at: Instant,
    rng: R,
}

impl<R: Rng> GameSession<R> {
    /// Validates the configuration and sets up an idle game.
    ///
    /// `rng` is the source for the external object ids.
    pub fn new(config: GameConfig, rng: R, now: Instant) -> Result<Self, SetupError> {
        if config.game_time == 0 {
            return Err(SetupError::ZeroGameTime);
        }
        if config.teams.is_empty() {
            return Err(SetupError::NoTeams);
        }
        let field = PlayingField::from_config(&config.fields)?;
        let rules = OperatingRules::from_config(&config);

        let mut teams: Vec<Team> = Vec::with_capacity(config.teams.len());
        let mut baskets = Vec::with_capacity(config.teams.len());
        let mut team_zones = Vec::new();
        for team_config in &config.teams {
            if teams.iter().any(|t| t.name == team_config.name) {
                return Err(SetupError::DuplicateTeam {
                    team: team_config.name.clone(),
                });
            }
            if teams.iter().any(|t| t.robot_id == team_config.robot) {
                return Err(SetupError::DuplicateRobot {
                    robot: team_config.robot,
                });
            }
            let robot =
                config
                    .robots
                    .get(&team_config.robot)
                    .ok_or_else(|| SetupError::UnknownRobot {
                        team: team_config.name.clone(),
                        robot: team_config.robot,
                    })?;
            let referenced_by = format!("Team '{}'", team_config.name);
            baskets.push(field.require(&team_config.basket, &referenced_by)?.clone());
            if let Some(zone) = &team_config.zone {
                team_zones.push(field.require(zone, &referenced_by)?.clone());
            }
            teams.push(Team::new(team_config, robot, rules));
        }

        let stations = config
            .charging_stations
            .iter()
            .map(|name| field.require(name, "The charging station list").cloned())
            .collect::<Result<Vec<Zone>, SetupError>>()?;
        if !stations.is_empty() && config.charging_time == 0 {
            return Err(SetupError::ZeroChargingTime);
        }
        if let Some(name) = &config.neutral_zone {
            field.require(name, "The neutral zone")?;
        }
        if let Some(name) = &config.field_zone {
            field.require(name, "The field outline")?;
        }

        let mut session = Self {
            field,
            last_healthy: vec![0; teams.len()],
            teams,
            baskets,
            team_zones,
            clock: GameClock::new(config.game_time),
            arbiter: ChargingArbiter::new(stations),
            hive_zones: BTreeMap::new(),
            external_ids: ExternalIds::new(),
            snapshot: Snapshot::default(),
            observed_at: now,
            rng,
            config,
        };
        session.regenerate_external_ids();
        info!(game = ?session.config.game, teams = session.teams.len(), "Game set up");
        Ok(session)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    pub fn time_left(&self) -> u32 {
        self.clock.time_left()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    pub fn arbiter(&self) -> &ChargingArbiter {
        &self.arbiter
    }

    pub fn external_ids(&self) -> &ExternalIds {
        &self.external_ids
    }

    /// The zone a hive was tagged with when first seen healthy.
    pub fn hive_zone(&self, id: &str) -> Option<&str> {
        self.hive_zones.get(id).map(String::as_str)
    }

    /// Starts a new game from scratch, whatever the current phase.
    pub fn start(&mut self, now: Instant) {
        self.clock.start(now);
        for team in &mut self.teams {
            team.reset(now);
        }
        self.arbiter.release_all();
        self.last_healthy = vec![0; self.teams.len()];
        self.hive_zones.clear();
        self.regenerate_external_ids();
        self.observed_at = now;
        info!(time_left = self.clock.time_left(), "Game started");
    }

    pub fn pause(&mut self, now: Instant) -> Result<(), IllegalTransition> {
        self.clock.pause(now)?;
        for team in &mut self.teams {
            team.pause(now);
        }
        self.observed_at = now;
        info!(time_left = self.clock.time_left(), "Game paused");
        Ok(())
    }

    pub fn resume(&mut self, now: Instant) -> Result<(), IllegalTransition> {
        self.clock.resume(now)?;
        for team in &mut self.teams {
            team.resume(now);
        }
        self.observed_at = now;
        info!(time_left = self.clock.time_left(), "Game resumed");
        Ok(())
    }

    pub fn stop(&mut self, now: Instant) -> Result<(), IllegalTransition> {
        self.clock.stop(now)?;
        self.finish(now);
        info!(time_left = self.clock.time_left(), "Game stopped");
        Ok(())
    }

    /// Ingests one snapshot.
    ///
    /// The snapshot is always stored for publishing, but scores and charging
    /// only change while the game is running. Returns true if the game ran
    /// out of time in this tick.
    pub fn tick(&mut self, snapshot: Snapshot, now: Instant) -> bool {
        self.snapshot = snapshot;
        self.observed_at = now;
        for id in self.snapshot.object_ids() {
            self.external_ids.assign(id, &mut self.rng);
        }

        if !self.clock.is_running() {
            return false;
        }
        if self.clock.update(now) {
            self.finish(now);
            info!("Time is up");
            return true;
        }

        if !self.arbiter.is_empty() {
            self.arbitrate_charging(now);
        }
        if self.config.game == ScoringRule::Hives {
            let neutral = self.config.neutral_zone.as_deref().unwrap_or(NEUTRAL);
            tag_hive_zones(
                &self.snapshot,
                &self.team_zones,
                neutral,
                &mut self.hive_zones,
            );
        }

        let card = self.config.game.evaluate(
            &self.snapshot,
            &self.teams,
            &self.baskets,
            &self.config.points,
            &self.last_healthy,
        );
        for (team, &total) in self.teams.iter_mut().zip(&card.totals) {
            team.score = total;
        }
        self.last_healthy = card.last_healthy;
        false
    }

    fn arbitrate_charging(&mut self, now: Instant) {
        let candidates: Vec<Candidate> = self
            .teams
            .iter()
            .map(|team| Candidate {
                robot_id: team.robot_id,
                position: self.snapshot.robot_position(team.robot_id),
                has_fuel: team.has_fuel(now),
            })
            .collect();
        for event in self.arbiter.arbitrate(&candidates) {
            match event {
                ChargingEvent::Start { robot_id } | ChargingEvent::Continue { robot_id } => {
                    if let Some(team) = self.teams.iter_mut().find(|t| t.robot_id == robot_id) {
                        team.charge(now);
                    }
                }
                ChargingEvent::Stop { robot_id } => {
                    if let Some(team) = self.teams.iter_mut().find(|t| t.robot_id == robot_id) {
                        team.stop_charging();
                    }
                }
            }
        }
    }

    /// Freezes the team clocks and frees all charging stations.
    fn finish(&mut self, now: Instant) {
        self.arbiter.release_all();
        for team in &mut self.teams {
            team.stop_charging();
            team.pause(now);
        }
        self.observed_at = now;
    }

    fn regenerate_external_ids(&mut self) {
        let configured = self.config.objects.values().flatten().map(String::as_str);
        self.external_ids
            .regenerate(configured.chain(self.snapshot.object_ids()), &mut self.rng);
    }

    /// The state as of the latest command or snapshot.
    pub fn state(&self) -> StateDocument {
        let mut objects = BTreeMap::new();
        for (category, samples) in &self.snapshot.objects {
            let mut views = BTreeMap::new();
            for (id, sample) in samples {
                let Some(token) = self.external_ids.get(id) else {
                    continue;
                };
                views.insert(
                    String::from(token),
                    ObjectView {
                        id: String::from(token),
                        position: sample.position,
                        points: sample.points.clone(),
                        zone: self.hive_zones.get(id).cloned(),
                    },
                );
            }
            objects.insert(category.clone(), views);
        }

        let robots = self
            .snapshot
            .robots
            .iter()
            .map(|(&id, sample)| {
                (
                    id,
                    RobotView {
                        position: sample.position,
                    },
                )
            })
            .collect();

        let polygon_of = |name: &str| self.field.get(name).map(|zone| zone.polygon.clone());
        let fields = FieldsView {
            baskets: self
                .teams
                .iter()
                .zip(&self.baskets)
                .map(|(team, basket)| (team.name.clone(), basket.polygon.clone()))
                .collect(),
            zones: self
                .teams
                .iter()
                .filter_map(|team| {
                    let polygon = polygon_of(team.zone.as_deref()?)?;
                    Some((team.name.clone(), polygon))
                })
                .collect(),
            neutral: self.config.neutral_zone.as_deref().and_then(polygon_of),
            field: self.config.field_zone.as_deref().and_then(polygon_of),
            charging_stations: self
                .arbiter
                .stations()
                .iter()
                .map(|s| (s.zone.name.clone(), s.zone.polygon.clone()))
                .collect(),
        };

        let has_stations = !self.arbiter.is_empty();
        let teams = self
            .teams
            .iter()
            .map(|team| {
                let view = TeamView {
                    id: team.robot_id,
                    name: team.name.clone(),
                    robot: team.robot_name.clone(),
                    color: team.color.clone(),
                    score: team.score,
                    fuel: team.fuel(self.observed_at).map(ceil_secs),
                    charging: has_stations.then(|| team.is_charging()),
                    charging_time_left: team
                        .charging_time_left(self.observed_at)
                        .map(ceil_secs),
                };
                (team.name.clone(), view)
            })
            .collect();

        StateDocument {
            objects,
            robots,
            fields,
            teams,
            time_left: self.clock.time_left(),
            running: self.clock.is_running(),
            paused: self.clock.phase() == Phase::Paused,
            game_time: self.config.game_time,
            robot_time: self.config.robot_time,
            charging_time: self.config.charging_time,
            charging_amount: self.config.charging_amount,
        }
    }
}
