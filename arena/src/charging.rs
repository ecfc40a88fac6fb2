use std::collections::BTreeSet;

use tracing::debug;

use crate::{Point, Zone};

/// An exclusive charging spot on the field.
#[derive(Clone, Debug)]
pub struct ChargingStation {
    pub zone: Zone,
    occupant: Option<u32>,
}

impl ChargingStation {
    pub fn occupant(&self) -> Option<u32> {
        self.occupant
    }
}

/// A robot competing for the stations in one tick.
#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    pub robot_id: u32,
    /// `None` if the tracker did not see the robot.
    pub position: Option<Point>,
    pub has_fuel: bool,
}

impl Candidate {
    /// The robot's position, if it is allowed to charge.
    fn eligible_position(&self) -> Option<Point> {
        self.position.filter(|_| self.has_fuel)
    }
}

/// What should happen to a robot's charging session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargingEvent {
    Start { robot_id: u32 },
    Continue { robot_id: u32 },
    Stop { robot_id: u32 },
}

/// Assigns at most one robot per charging station.
///
/// A robot keeps its station until it leaves the station's zone or becomes
/// ineligible, and is never moved to another station while it holds one.
#[derive(Clone, Debug, Default)]
pub struct ChargingArbiter {
    stations: Vec<ChargingStation>,
}

impl ChargingArbiter {
    /// The stations are arbitrated in the given order.
    pub fn new(zones: Vec<Zone>) -> Self {
        Self {
            stations: zones
                .into_iter()
                .map(|zone| ChargingStation {
                    zone,
                    occupant: None,
                })
                .collect(),
        }
    }

    pub fn stations(&self) -> &[ChargingStation] {
        &self.stations
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn station_of(&self, robot_id: u32) -> Option<&ChargingStation> {
        self.stations
            .iter()
            .find(|s| s.occupant == Some(robot_id))
    }

    /// Empties every station and returns the robots that were on them.
    pub fn release_all(&mut self) -> Vec<u32> {
        self.stations
            .iter_mut()
            .filter_map(|s| s.occupant.take())
            .collect()
    }

    /// Runs one round of arbitration.
    ///
    /// Candidates are considered in the given order when several want the
    /// same free station. A robot that is not among the candidates counts as
    /// not located.
    pub fn arbitrate(&mut self, candidates: &[Candidate]) -> Vec<ChargingEvent> {
        let mut events = Vec::new();
        let mut holding = BTreeSet::new();

        // Keep or release the current occupants
        for station in &mut self.stations {
            let Some(robot_id) = station.occupant else {
                continue;
            };
            let stays = candidates
                .iter()
                .find(|c| c.robot_id == robot_id)
                .and_then(Candidate::eligible_position)
                .is_some_and(|p| station.zone.polygon.contains(p));
            if stays {
                holding.insert(robot_id);
                events.push(ChargingEvent::Continue { robot_id });
            } else {
                debug!(robot_id, station = %station.zone.name, "Charging stopped");
                station.occupant = None;
                events.push(ChargingEvent::Stop { robot_id });
            }
        }

        // Hand out free stations
        for candidate in candidates {
            if holding.contains(&candidate.robot_id) {
                continue;
            }
            let Some(position) = candidate.eligible_position() else {
                continue;
            };
            if let Some(station) = self
                .stations
                .iter_mut()
                .find(|s| s.occupant.is_none() && s.zone.polygon.contains(position))
            {
                debug!(
                    robot_id = candidate.robot_id,
                    station = %station.zone.name,
                    "Charging started"
                );
                station.occupant = Some(candidate.robot_id);
                holding.insert(candidate.robot_id);
                events.push(ChargingEvent::Start {
                    robot_id: candidate.robot_id,
                });
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::rect;

    fn arbiter() -> ChargingArbiter {
        ChargingArbiter::new(vec![
            Zone {
                name: String::from("charging_station_1"),
                polygon: rect(0.0, 0.0, 10.0, 10.0),
            },
            Zone {
                name: String::from("charging_station_2"),
                polygon: rect(20.0, 0.0, 30.0, 10.0),
            },
        ])
    }

    fn at(robot_id: u32, x: f64, y: f64) -> Candidate {
        Candidate {
            robot_id,
            position: Some(Point::new(x, y)),
            has_fuel: true,
        }
    }

    #[test]
    fn robot_takes_free_station_and_keeps_it() {
        let mut arbiter = arbiter();
        let events = arbiter.arbitrate(&[at(1, 5.0, 5.0)]);
        assert_eq!(events, vec![ChargingEvent::Start { robot_id: 1 }]);
        assert_eq!(arbiter.stations()[0].occupant(), Some(1));

        let events = arbiter.arbitrate(&[at(1, 6.0, 5.0)]);
        assert_eq!(events, vec![ChargingEvent::Continue { robot_id: 1 }]);
    }

    #[test]
    fn occupied_station_is_not_shared() {
        let mut arbiter = arbiter();
        arbiter.arbitrate(&[at(1, 5.0, 5.0)]);
        let events = arbiter.arbitrate(&[at(2, 4.0, 4.0), at(1, 5.0, 5.0)]);
        assert_eq!(events, vec![ChargingEvent::Continue { robot_id: 1 }]);
        assert_eq!(arbiter.stations()[0].occupant(), Some(1));
        assert!(arbiter.station_of(2).is_none());
    }

    #[test]
    fn first_candidate_wins_a_contested_station() {
        let mut arbiter = arbiter();
        let events = arbiter.arbitrate(&[at(2, 4.0, 4.0), at(1, 5.0, 5.0)]);
        assert_eq!(events, vec![ChargingEvent::Start { robot_id: 2 }]);
    }

    #[test]
    fn leaving_the_zone_releases_the_station() {
        let mut arbiter = arbiter();
        arbiter.arbitrate(&[at(1, 5.0, 5.0)]);
        let events = arbiter.arbitrate(&[at(1, 15.0, 5.0)]);
        assert_eq!(events, vec![ChargingEvent::Stop { robot_id: 1 }]);
        assert!(arbiter.stations()[0].occupant().is_none());
    }

    #[test]
    fn robot_moving_to_another_station_restarts_there() {
        let mut arbiter = arbiter();
        arbiter.arbitrate(&[at(1, 5.0, 5.0)]);
        let events = arbiter.arbitrate(&[at(1, 25.0, 5.0)]);
        assert_eq!(
            events,
            vec![
                ChargingEvent::Stop { robot_id: 1 },
                ChargingEvent::Start { robot_id: 1 }
            ]
        );
        assert_eq!(arbiter.station_of(1).unwrap().zone.name, "charging_station_2");
    }

    #[test]
    fn ineligible_occupant_is_released_within_one_tick() {
        let mut arbiter = arbiter();
        arbiter.arbitrate(&[at(1, 5.0, 5.0)]);
        let mut out_of_fuel = at(1, 5.0, 5.0);
        out_of_fuel.has_fuel = false;
        let events = arbiter.arbitrate(&[out_of_fuel]);
        assert_eq!(events, vec![ChargingEvent::Stop { robot_id: 1 }]);
        assert!(arbiter.station_of(1).is_none());

        // The same for a robot that disappears from the snapshot
        arbiter.arbitrate(&[at(2, 25.0, 5.0)]);
        let events = arbiter.arbitrate(&[]);
        assert_eq!(events, vec![ChargingEvent::Stop { robot_id: 2 }]);
    }

    #[test]
    fn release_all() {
        let mut arbiter = arbiter();
        arbiter.arbitrate(&[at(1, 5.0, 5.0), at(2, 25.0, 5.0)]);
        assert_eq!(arbiter.release_all(), vec![1, 2]);
        assert!(arbiter.stations().iter().all(|s| s.occupant().is_none()));
    }

    quickcheck! {
        fn stations_never_have_two_occupants(moves: Vec<(u8, u8, bool)>) -> bool {
            let mut arbiter = arbiter();
            for chunk in moves.chunks(3) {
                let candidates: Vec<Candidate> = chunk
                    .iter()
                    .enumerate()
                    .map(|(idx, &(x, y, has_fuel))| Candidate {
                        robot_id: idx as u32,
                        position: Some(Point::new((x % 32) as f64, (y % 12) as f64)),
                        has_fuel,
                    })
                    .collect();
                arbiter.arbitrate(&candidates);
                let occupants: Vec<u32> = arbiter.stations().iter().filter_map(|s| s.occupant()).collect();
                let unique: BTreeSet<u32> = occupants.iter().copied().collect();
                if unique.len() != occupants.len() {
                    return false;
                }
                // Every occupant is eligible and inside its station
                for station in arbiter.stations() {
                    if let Some(robot_id) = station.occupant() {
                        let c = &candidates[robot_id as usize];
                        if !c.has_fuel || !station.zone.polygon.contains(c.position.unwrap()) {
                            return false;
                        }
                    }
                }
            }
            true
        }
    }
}
