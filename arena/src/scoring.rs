use std::collections::BTreeMap;

use tracing::debug;

use crate::snapshot::category;
use crate::{classify, Point, Points, ScoringRule, Snapshot, Team, Zone};

/// The outcome of scoring one snapshot, indexed like the team list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreCard {
    pub totals: Vec<i32>,
    /// The value of the most recent healthy hive seen in each basket.
    ///
    /// Carried from tick to tick; only used by [`ScoringRule::Hives`].
    pub last_healthy: Vec<i32>,
}

impl ScoringRule {
    /// Scores a snapshot without touching the teams.
    ///
    /// `baskets[k]` is the basket of `teams[k]`, and `last_healthy` is the
    /// value carried over from the previous tick.
    pub fn evaluate(
        self,
        snapshot: &Snapshot,
        teams: &[Team],
        baskets: &[Zone],
        points: &Points,
        last_healthy: &[i32],
    ) -> ScoreCard {
        debug_assert_eq!(teams.len(), baskets.len());
        match self {
            ScoringRule::Hives => score_hives(snapshot, teams, baskets, points, last_healthy),
            ScoringRule::Mine => ScoreCard {
                totals: score_mine(snapshot, baskets, points),
                last_healthy: last_healthy.to_vec(),
            },
        }
    }
}

fn score_hives(
    snapshot: &Snapshot,
    teams: &[Team],
    baskets: &[Zone],
    points: &Points,
    last_healthy: &[i32],
) -> ScoreCard {
    let mut last_healthy = last_healthy.to_vec();
    let mut diseased_count = vec![0i32; teams.len()];

    for (_, hive) in snapshot.objects_of(category::HEALTHY_HIVE) {
        if let Some(idx) = basket_index(hive.position, baskets) {
            // Overwrites, so only the last healthy hive in id order counts
            last_healthy[idx] = hive.points.get(&teams[idx].name).copied().unwrap_or(0);
        }
    }
    for (_, hive) in snapshot.objects_of(category::DISEASED_HIVE) {
        if let Some(idx) = basket_index(hive.position, baskets) {
            diseased_count[idx] += 1;
        }
    }

    let totals = last_healthy
        .iter()
        .zip(&diseased_count)
        .map(|(&healthy, &count)| healthy - count * points.diseased)
        .collect();
    ScoreCard {
        totals,
        last_healthy,
    }
}

fn score_mine(snapshot: &Snapshot, baskets: &[Zone], points: &Points) -> Vec<i32> {
    let mut totals = vec![0; baskets.len()];
    for (kind, value) in [
        (category::GOOD_ORE, points.good),
        (category::BAD_ORE, points.bad),
    ] {
        for (_, ore) in snapshot.objects_of(kind) {
            for (total, basket) in totals.iter_mut().zip(baskets) {
                if basket.polygon.contains(ore.position) {
                    *total += value;
                }
            }
        }
    }
    totals
}

/// Index of the first basket containing the point.
fn basket_index(point: Point, baskets: &[Zone]) -> Option<usize> {
    let name = classify(point, baskets)?;
    baskets.iter().position(|b| b.name == name)
}

/// Records which zone every newly seen healthy hive is in.
///
/// A hive is tagged the first time it shows up healthy, and keeps its tag for
/// the rest of the game. `team_zones` are tested in order; a hive outside all
/// of them is tagged `neutral`.
pub fn tag_hive_zones(
    snapshot: &Snapshot,
    team_zones: &[Zone],
    neutral: &str,
    tags: &mut BTreeMap<String, String>,
) {
    for (id, hive) in snapshot.objects_of(category::HEALTHY_HIVE) {
        if tags.contains_key(id) {
            continue;
        }
        let zone = classify(hive.position, team_zones).unwrap_or(neutral);
        debug!(hive = id, zone, "Tagged hive");
        tags.insert(String::from(id), String::from(zone));
    }
}
