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

//! Validation of incoming connections.
//!
//! Realtime feeds lie : delays come in half-reported, stops are missing,
//! updates repeat. Every suspicious connection is turned into a
//! `ConnectionViolation` and submitted to the `ValidationPolicy` of the
//! writer, which decides whether to keep or drop it. The default policy
//! drops and warns.

use crate::{
    identifiers::{StopId, TripId},
    time::{PositiveDuration, SecondsSinceEpoch},
    transit_data::connections::ConnectionMode,
};
use std::fmt::{Display, Formatter};
use tracing::warn;

/// A connection as handed to the writer, before validation.
///
/// Times are the scheduled ones. When a delay is known it is given
/// separately, and the effective times are computed here. A `None`
/// delay means "not reported", which is not the same thing as zero :
/// the repair heuristic may fill it in.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    pub global_id: String,
    pub dep_stop: StopId,
    pub arr_stop: StopId,
    pub departure_time: SecondsSinceEpoch,
    pub arrival_time: SecondsSinceEpoch,
    pub departure_delay: Option<u16>,
    pub arrival_delay: Option<u16>,
    pub trip: TripId,
    pub mode: ConnectionMode,
}

impl ConnectionRecord {
    pub fn effective_departure_time(&self) -> SecondsSinceEpoch {
        self.departure_time
            + PositiveDuration::from_seconds(u32::from(self.departure_delay.unwrap_or(0)))
    }

    pub fn effective_arrival_time(&self) -> SecondsSinceEpoch {
        self.arrival_time
            + PositiveDuration::from_seconds(u32::from(self.arrival_delay.unwrap_or(0)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionViolation {
    UnknownDepartureStop {
        stop: StopId,
    },
    UnknownArrivalStop {
        stop: StopId,
    },
    /// Arrival precedes departure, even after the delay repair
    /// heuristic ran.
    ArrivalBeforeDeparture {
        departure_time: SecondsSinceEpoch,
        arrival_time: SecondsSinceEpoch,
    },
    /// Departure and arrival stop are the same.
    SameDepartureAndArrival {
        stop: StopId,
    },
    /// A connection with this global id was already inserted.
    DuplicateGlobalId {
        global_id: String,
    },
    /// The travel time does not fit the storage format.
    TravelTimeTooLarge {
        travel_seconds: u64,
    },
}

impl Display for ConnectionViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionViolation::UnknownDepartureStop { stop } => {
                write!(f, "the departure stop {} is not in the stops table", stop)
            }
            ConnectionViolation::UnknownArrivalStop { stop } => {
                write!(f, "the arrival stop {} is not in the stops table", stop)
            }
            ConnectionViolation::ArrivalBeforeDeparture {
                departure_time,
                arrival_time,
            } => {
                write!(
                    f,
                    "the arrival time {} is before the departure time {}",
                    arrival_time, departure_time
                )
            }
            ConnectionViolation::SameDepartureAndArrival { stop } => {
                write!(f, "the connection departs from and arrives at {}", stop)
            }
            ConnectionViolation::DuplicateGlobalId { global_id } => {
                write!(f, "a connection with global id '{}' already exists", global_id)
            }
            ConnectionViolation::TravelTimeTooLarge { travel_seconds } => {
                write!(
                    f,
                    "the travel time of {}s exceeds the storable maximum of {}s",
                    travel_seconds,
                    u16::MAX
                )
            }
        }
    }
}

impl std::error::Error for ConnectionViolation {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationDecision {
    Keep,
    Drop,
}

/// Hooks called by a writer while it validates incoming connections.
///
/// The default implementations encode the behavior wanted in the vast
/// majority of deployments. Override them to archive rejects somewhere,
/// to accept known-dubious feeds, or to change the delay repair.
pub trait ValidationPolicy {
    /// Fills in delay values missing from the record, before the time
    /// consistency check runs.
    ///
    /// The default heuristic : when only the departure delay is
    /// reported, assume the vehicle carries the same delay to its
    /// arrival.
    fn repair_delays(&self, record: &mut ConnectionRecord) {
        if record.arrival_delay.is_none() {
            record.arrival_delay = record.departure_delay;
        }
    }

    /// Decides the fate of a connection violating one of the validation
    /// rules. Default : drop it, with a warning.
    fn on_violation(
        &self,
        violation: &ConnectionViolation,
        record: &ConnectionRecord,
    ) -> ValidationDecision {
        warn!("Dropping connection '{}' : {}", record.global_id, violation);
        ValidationDecision::Drop
    }
}

/// The drop-and-warn policy used when no custom policy is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValidationPolicy;

impl ValidationPolicy for DefaultValidationPolicy {}
