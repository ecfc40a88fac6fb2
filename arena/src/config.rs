use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Point, Polygon, SetupError, Zone};

/// Which set of scoring rules a game uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringRule {
    /// Capture healthy hives, with a penalty for every diseased hive.
    Hives,
    /// Deposit good and bad ore into the team's basket.
    Mine,
}

/// An entry of the robot table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotConfig {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TeamConfig {
    /// The key for this team in the state document and in object point tables.
    pub name: String,
    /// Must be a key of [`GameConfig::robots`].
    pub robot: u32,
    pub color: String,
    /// The zone where this team scores.
    pub basket: String,
    /// The team's half of the field, used to tag where hives come from.
    #[serde(default)]
    pub zone: Option<String>,
}

/// Point values. Which of them are used depends on the [`ScoringRule`].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Points {
    #[serde(default)]
    pub good: i32,
    #[serde(default)]
    pub bad: i32,
    /// Subtracted once per diseased hive in a basket.
    #[serde(default)]
    pub diseased: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub points: Vec<Point>,
}

/// Everything needed to set up a game. Read once, never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    pub game: ScoringRule,
    /// Game duration in seconds.
    pub game_time: u32,
    pub robots: BTreeMap<u32, RobotConfig>,
    pub teams: Vec<TeamConfig>,
    #[serde(default)]
    pub points: Points,
    /// Operating time budget per robot in seconds. Unlimited if absent.
    #[serde(default)]
    pub robot_time: Option<u32>,
    /// Seconds a robot must stay on a station to earn one charge.
    #[serde(default)]
    pub charging_time: u32,
    /// Seconds of operating time granted per charge.
    #[serde(default)]
    pub charging_amount: u32,
    /// Zone definitions. Their order is the classification priority.
    pub fields: Vec<FieldConfig>,
    /// Zones that act as exclusive charging stations, in arbitration order.
    #[serde(default)]
    pub charging_stations: Vec<String>,
    #[serde(default)]
    pub neutral_zone: Option<String>,
    /// The outline of the whole playing field.
    #[serde(default)]
    pub field_zone: Option<String>,
    /// Tracked object ids per category, known before the game.
    ///
    /// These get external ids up front; objects that only show up in
    /// snapshots get theirs when first seen.
    #[serde(default)]
    pub objects: BTreeMap<String, Vec<String>>,
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// The validated zones of a game, in priority order.
#[derive(Clone, Debug)]
pub struct PlayingField {
    zones: Vec<Zone>,
}

impl PlayingField {
    pub fn from_config(fields: &[FieldConfig]) -> Result<Self, SetupError> {
        let mut zones: Vec<Zone> = Vec::with_capacity(fields.len());
        for field in fields {
            if zones.iter().any(|z| z.name == field.name) {
                return Err(SetupError::DuplicateZone {
                    zone: field.name.clone(),
                });
            }
            let polygon =
                Polygon::new(field.points.clone()).ok_or_else(|| SetupError::DegeneratePolygon {
                    zone: field.name.clone(),
                })?;
            zones.push(Zone {
                name: field.name.clone(),
                polygon,
            });
        }
        Ok(Self { zones })
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn get(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// Like [`Self::get()`], but a missing zone is a setup error.
    pub fn require(&self, name: &str, referenced_by: &str) -> Result<&Zone, SetupError> {
        self.get(name).ok_or_else(|| SetupError::UnknownZone {
            zone: String::from(name),
            referenced_by: String::from(referenced_by),
        })
    }
}
