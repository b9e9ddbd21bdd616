// Copyright  (C) 2020, Kisio Digital and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Kisio Digital (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia
// www.navitia.io

//! Journeys in a caller-facing shape.
//!
//! The scans hand journeys back as [`Link`]s into a [`JourneysTree`].
//! [`Journey::from_link`] reads the chain back, puts it in travel order
//! whatever direction the scan grew it in, and groups consecutive
//! connections of the same trip into a single vehicle leg.

use crate::{
    criteria::Metric,
    engine::{JourneysTree, Link, LinkKind},
    identifiers::{ConnectionId, StopId, TripId},
    time::{PositiveDuration, SecondsSinceEpoch},
    transit_data::TransitData,
};
use chrono::NaiveDateTime;
use std::fmt::{Display, Formatter};

/// One ride, possibly spanning several consecutive connections of the
/// same trip.
#[derive(Debug, Clone)]
pub struct VehicleLeg {
    pub trip: TripId,
    pub board_stop: StopId,
    pub board_time: SecondsSinceEpoch,
    pub alight_stop: StopId,
    pub alight_time: SecondsSinceEpoch,
    /// the connections ridden, in travel order
    pub connections: Vec<ConnectionId>,
}

/// A footpath between two stops, or within one stop when
/// `from_stop == to_stop`.
#[derive(Debug, Clone)]
pub struct WalkLeg {
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub departure_time: SecondsSinceEpoch,
    pub duration: PositiveDuration,
}

impl WalkLeg {
    pub fn arrival_time(&self) -> SecondsSinceEpoch {
        self.departure_time + self.duration
    }
}

#[derive(Debug, Clone)]
pub enum Leg {
    Vehicle(VehicleLeg),
    Walk(WalkLeg),
}

/// A complete journey, in travel order.
#[derive(Debug, Clone)]
pub struct Journey {
    departure_stop: StopId,
    departure_time: SecondsSinceEpoch,
    arrival_stop: StopId,
    arrival_time: SecondsSinceEpoch,
    legs: Vec<Leg>,
}

/// Returned by [`Journey::from_link`] when the search tree and the
/// snapshot do not tell the same story, typically because the journey
/// is extracted against another snapshot than the one that was scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadJourney {
    UnknownConnection(ConnectionId),
    /// the chain rides a connection that does not depart (or arrive)
    /// where the tree says it does
    ConnectionMismatch {
        connection: ConnectionId,
        expected_stop: StopId,
    },
}

impl Display for BadJourney {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BadJourney::UnknownConnection(connection) => {
                write!(f, "the snapshot does not contain {}", connection)
            }
            BadJourney::ConnectionMismatch {
                connection,
                expected_stop,
            } => {
                write!(
                    f,
                    "the journey rides {} through {} but the snapshot disagrees",
                    connection, expected_stop
                )
            }
        }
    }
}

impl std::error::Error for BadJourney {}

struct RawLeg {
    from_stop: StopId,
    from_time: SecondsSinceEpoch,
    to_stop: StopId,
    kind: LinkKind,
}

impl Journey {
    /// Reads the chain of `link` back from the tree and shapes it into
    /// a journey. Works on chains grown forward (earliest arrival) as
    /// well as backward (latest departure, profiles) : the travel order
    /// is recovered from the times at both ends of the chain.
    pub fn from_link<M: Metric>(
        tree: &JourneysTree<M>,
        link: &Link,
        data: &TransitData,
    ) -> Result<Self, BadJourney> {
        let chain: Vec<(StopId, SecondsSinceEpoch, LinkKind)> = tree
            .chain_of(link)
            .map(|step| (tree.stop_of(&step), tree.time_of(&step), tree.kind_of(&step)))
            .collect();
        let root = tree.root_of(link);
        let (root_stop, root_time) = (tree.stop_of(&root), tree.time_of(&root));
        let (head_stop, head_time) = (tree.stop_of(link), tree.time_of(link));
        let forward = root_time <= head_time;

        let mut raw_legs: Vec<RawLeg> = Vec::with_capacity(chain.len().saturating_sub(1));
        for pair in chain.windows(2) {
            // pair[0] is the link closer to the head, and its kind
            // describes the leg between the two links
            let (near_stop, near_time, kind) = pair[0];
            let (far_stop, far_time, _) = pair[1];
            if forward {
                raw_legs.push(RawLeg {
                    from_stop: far_stop,
                    from_time: far_time,
                    to_stop: near_stop,
                    kind,
                });
            } else {
                raw_legs.push(RawLeg {
                    from_stop: near_stop,
                    from_time: near_time,
                    to_stop: far_stop,
                    kind,
                });
            }
        }
        if forward {
            raw_legs.reverse();
        }

        let mut legs: Vec<Leg> = Vec::new();
        for raw_leg in raw_legs {
            match raw_leg.kind {
                LinkKind::Genesis => {
                    // only the root of a chain is a genesis
                    debug_assert!(false, "genesis in the middle of a chain");
                }
                LinkKind::Walk { duration } => legs.push(Leg::Walk(WalkLeg {
                    from_stop: raw_leg.from_stop,
                    to_stop: raw_leg.to_stop,
                    departure_time: raw_leg.from_time,
                    duration,
                })),
                LinkKind::Vehicle { connection, trip } => {
                    let record = data
                        .connections
                        .get(&connection)
                        .ok_or(BadJourney::UnknownConnection(connection))?;
                    if record.dep_stop != raw_leg.from_stop {
                        return Err(BadJourney::ConnectionMismatch {
                            connection,
                            expected_stop: raw_leg.from_stop,
                        });
                    }
                    if record.arr_stop != raw_leg.to_stop {
                        return Err(BadJourney::ConnectionMismatch {
                            connection,
                            expected_stop: raw_leg.to_stop,
                        });
                    }
                    match legs.last_mut() {
                        Some(Leg::Vehicle(leg)) if leg.trip == trip => {
                            leg.connections.push(connection);
                            leg.alight_stop = record.arr_stop;
                            leg.alight_time = record.arrival_time();
                        }
                        _ => legs.push(Leg::Vehicle(VehicleLeg {
                            trip,
                            board_stop: record.dep_stop,
                            board_time: record.departure_time,
                            alight_stop: record.arr_stop,
                            alight_time: record.arrival_time(),
                            connections: vec![connection],
                        })),
                    }
                }
            }
        }

        let (departure_stop, departure_time, arrival_stop, arrival_time) = if forward {
            (root_stop, root_time, head_stop, head_time)
        } else {
            (head_stop, head_time, root_stop, root_time)
        };
        Ok(Journey {
            departure_stop,
            departure_time,
            arrival_stop,
            arrival_time,
            legs,
        })
    }

    pub fn departure_stop(&self) -> StopId {
        self.departure_stop
    }

    pub fn departure_time(&self) -> SecondsSinceEpoch {
        self.departure_time
    }

    pub fn arrival_stop(&self) -> StopId {
        self.arrival_stop
    }

    pub fn arrival_time(&self) -> SecondsSinceEpoch {
        self.arrival_time
    }

    pub fn departure_datetime(&self) -> Option<NaiveDateTime> {
        self.departure_time.to_datetime()
    }

    pub fn arrival_datetime(&self) -> Option<NaiveDateTime> {
        self.arrival_time.to_datetime()
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn nb_of_legs(&self) -> usize {
        self.legs.len()
    }

    pub fn nb_of_vehicle_legs(&self) -> usize {
        self.legs
            .iter()
            .filter(|leg| matches!(leg, Leg::Vehicle(_)))
            .count()
    }

    pub fn nb_of_transfers(&self) -> usize {
        self.nb_of_vehicle_legs().saturating_sub(1)
    }

    pub fn nb_of_connections(&self) -> usize {
        self.legs
            .iter()
            .map(|leg| match leg {
                Leg::Vehicle(vehicle) => vehicle.connections.len(),
                Leg::Walk(_) => 0,
            })
            .sum()
    }

    pub fn total_duration(&self) -> PositiveDuration {
        self.arrival_time
            .duration_since(&self.departure_time)
            .unwrap_or_else(PositiveDuration::zero)
    }

    pub fn total_walking_duration(&self) -> PositiveDuration {
        self.legs
            .iter()
            .filter_map(|leg| match leg {
                Leg::Walk(walk) => Some(walk.duration),
                Leg::Vehicle(_) => None,
            })
            .fold(PositiveDuration::zero(), |total, duration| total + duration)
    }

    pub fn total_in_vehicle_duration(&self) -> PositiveDuration {
        self.legs
            .iter()
            .filter_map(|leg| match leg {
                Leg::Vehicle(vehicle) => vehicle.alight_time.duration_since(&vehicle.board_time),
                Leg::Walk(_) => None,
            })
            .fold(PositiveDuration::zero(), |total, duration| total + duration)
    }

    /// When the first vehicle is boarded. None for an all-walk journey.
    pub fn first_board_time(&self) -> Option<SecondsSinceEpoch> {
        self.legs.iter().find_map(|leg| match leg {
            Leg::Vehicle(vehicle) => Some(vehicle.board_time),
            Leg::Walk(_) => None,
        })
    }

    /// When the last vehicle is left. None for an all-walk journey.
    pub fn last_alight_time(&self) -> Option<SecondsSinceEpoch> {
        self.legs.iter().rev().find_map(|leg| match leg {
            Leg::Vehicle(vehicle) => Some(vehicle.alight_time),
            Leg::Walk(_) => None,
        })
    }

    pub fn print(&self, data: &TransitData) -> Result<String, std::fmt::Error> {
        let mut result = String::new();
        self.write(data, &mut result)?;
        Ok(result)
    }

    pub fn write<Writer: std::fmt::Write>(
        &self,
        data: &TransitData,
        writer: &mut Writer,
    ) -> Result<(), std::fmt::Error> {
        writeln!(writer, "*** New journey ***")?;
        writeln!(
            writer,
            "Departure : {} at {}",
            stop_name(data, &self.departure_stop),
            self.departure_time
        )?;
        let mut current_time = self.departure_time;
        for leg in &self.legs {
            match leg {
                Leg::Walk(walk) => {
                    writeln!(
                        writer,
                        "Walk {} from {} to {}",
                        walk.duration,
                        stop_name(data, &walk.from_stop),
                        stop_name(data, &walk.to_stop),
                    )?;
                    current_time = walk.arrival_time();
                }
                Leg::Vehicle(vehicle) => {
                    if let Some(wait) = vehicle.board_time.duration_since(&current_time) {
                        if !wait.is_zero() {
                            writeln!(
                                writer,
                                "Wait {} at {}",
                                wait,
                                stop_name(data, &vehicle.board_stop)
                            )?;
                        }
                    }
                    writeln!(
                        writer,
                        "Ride {} from {} at {} to {} at {} ({} connections)",
                        trip_name(data, &vehicle.trip),
                        stop_name(data, &vehicle.board_stop),
                        vehicle.board_time,
                        stop_name(data, &vehicle.alight_stop),
                        vehicle.alight_time,
                        vehicle.connections.len(),
                    )?;
                    current_time = vehicle.alight_time;
                }
            }
        }
        writeln!(
            writer,
            "Arrival : {} at {}",
            stop_name(data, &self.arrival_stop),
            self.arrival_time
        )?;
        Ok(())
    }
}

/// The journeys folded into `head` by [`JourneysTree::join`], `head`
/// itself first, capped at `max_nb_of_journeys`.
pub fn enumerate_alternatives<M: Metric>(
    tree: &JourneysTree<M>,
    head: &Link,
    max_nb_of_journeys: usize,
) -> Vec<Link> {
    let mut result = Vec::new();
    let mut cursor = Some(*head);
    while let Some(link) = cursor {
        if result.len() >= max_nb_of_journeys {
            break;
        }
        result.push(link);
        cursor = tree.alternative(&link);
    }
    result
}

fn stop_name(data: &TransitData, stop: &StopId) -> String {
    match data.stops.get(stop) {
        Some(record) => record.global_id.clone(),
        None => stop.to_string(),
    }
}

fn trip_name(data: &TransitData, trip: &TripId) -> String {
    match data.trips.get(trip) {
        Some(record) => record.global_id.clone(),
        None => trip.to_string(),
    }
}
