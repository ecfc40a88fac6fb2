use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Point, Polygon};

/// The published state of a game, as sent to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDocument {
    /// Category, then external id.
    pub objects: BTreeMap<String, BTreeMap<String, ObjectView>>,
    /// Robots seen in the latest snapshot.
    #[serde(deserialize_with = "crate::snapshot::robot_ids")]
    pub robots: BTreeMap<u32, RobotView>,
    pub fields: FieldsView,
    /// By team name.
    pub teams: BTreeMap<String, TeamView>,
    pub time_left: u32,
    pub running: bool,
    pub paused: bool,
    pub game_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robot_time: Option<u32>,
    pub charging_time: u32,
    pub charging_amount: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectView {
    /// The external id, same as the key.
    pub id: String,
    pub position: Point,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub points: BTreeMap<String, i32>,
    /// The zone a hive was first seen in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotView {
    pub position: Point,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsView {
    /// By team name.
    pub baskets: BTreeMap<String, Polygon>,
    /// By team name, for teams that have a zone.
    pub zones: BTreeMap<String, Polygon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neutral: Option<Polygon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Polygon>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub charging_stations: BTreeMap<String, Polygon>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    /// The robot id.
    pub id: u32,
    pub name: String,
    pub robot: String,
    pub color: String,
    pub score: i32,
    /// Seconds of operating time left, if limited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<u32>,
    /// Only present in games with charging stations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_time_left: Option<u32>,
}
