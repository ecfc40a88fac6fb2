use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::de::{Error, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

use crate::Point;

/// Object categories with a meaning to the scoring rules.
///
/// Snapshots may contain any other category; those are tracked and
/// serialized, but never scored.
pub mod category {
    pub const HEALTHY_HIVE: &str = "healthy_hive";
    pub const DISEASED_HIVE: &str = "diseased_hive";
    pub const GOOD_ORE: &str = "good_ore";
    pub const BAD_ORE: &str = "bad_ore";
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotSample {
    pub position: Point,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectSample {
    pub position: Point,
    /// Points awarded per team name, for categories that carry their own value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub points: BTreeMap<String, i32>,
}

/// One periodic sample from the tracker.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Only the robots the tracker currently sees.
    #[serde(default, deserialize_with = "robot_ids")]
    pub robots: BTreeMap<u32, RobotSample>,
    /// Category, then object id.
    #[serde(default)]
    pub objects: BTreeMap<String, BTreeMap<String, ObjectSample>>,
}

impl Snapshot {
    pub fn robot_position(&self, robot_id: u32) -> Option<Point> {
        self.robots.get(&robot_id).map(|r| r.position)
    }

    /// All objects of a category, in id order. Empty if there are none.
    ///
    /// See [`compare_ids`] for the order.
    pub fn objects_of<'a>(
        &'a self,
        category: &str,
    ) -> impl Iterator<Item = (&'a str, &'a ObjectSample)> + 'a {
        let mut objects: Vec<(&'a str, &'a ObjectSample)> = self
            .objects
            .get(category)
            .into_iter()
            .flat_map(|objects| objects.iter().map(|(id, o)| (id.as_str(), o)))
            .collect();
        objects.sort_by(|(a, _), (b, _)| compare_ids(a, b));
        objects.into_iter()
    }

    pub fn object_ids(&self) -> impl Iterator<Item = &str> {
        self.objects
            .values()
            .flat_map(|objects| objects.keys().map(String::as_str))
    }
}

/// Orders tracker ids numerically if both are numbers, and as text otherwise.
///
/// Numeric ids come before all others.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Reads a map keyed by robot id.
///
/// The keys are read as strings, since that is all a buffered map (e.g.
/// inside an internally tagged enum) can provide.
pub(crate) fn robot_ids<'de, D, V>(deserializer: D) -> Result<BTreeMap<u32, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let by_name = BTreeMap::<String, V>::deserialize(deserializer)?;
    let mut robots = BTreeMap::new();
    for (key, value) in by_name {
        let Ok(robot_id) = key.parse::<u32>() else {
            return Err(D::Error::invalid_value(Unexpected::Str(&key), &"a robot id"));
        };
        robots.insert(robot_id, value);
    }
    Ok(robots)
}
