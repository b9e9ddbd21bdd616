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
// www.navitia.io

//! Reachability extracted from a completed scan.
//!
//! An [`IsochroneFilter`] condenses an earliest arrival or latest
//! departure scan into one time per reached stop. A later, more
//! expensive scan over the same window (typically the profiled scan)
//! can then use it as a [`ConnectionFilter`] : connections whose
//! relevant endpoint lies outside the isochrone are skipped without
//! touching any frontier.
//!
//! The filter is only meaningful over the window of the scan it came
//! from. Asking it about another window is a caller bug and fails
//! loudly rather than answering "unreachable".

use crate::{
    criteria::Metric,
    engine::{earliest_arrival::EarliestArrivalScan, latest_departure::LatestDepartureScan},
    filters::ConnectionFilter,
    identifiers::{ConnectionId, StopId},
    time::{SecondsSinceEpoch, TimeWindow},
    transit_data::Connection,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsochroneDirection {
    /// built from an earliest arrival scan : the reach time of a stop
    /// is the earliest one can arrive there from the anchor
    FromSource,
    /// built from a latest departure scan : the reach time of a stop
    /// is the latest one can leave it and still make the anchor
    TowardTarget,
}

#[derive(Debug, Clone)]
pub struct IsochroneFilter {
    direction: IsochroneDirection,
    anchor: StopId,
    window: TimeWindow,
    reach: HashMap<StopId, SecondsSinceEpoch>,
}

impl IsochroneFilter {
    pub fn from_earliest_arrival<M: Metric>(scan: &EarliestArrivalScan<M>) -> Self {
        let reach = scan
            .reached_stops()
            .map(|(stop, link)| (*stop, scan.tree().time_of(link)))
            .collect();
        Self {
            direction: IsochroneDirection::FromSource,
            anchor: *scan.source(),
            window: *scan.window(),
            reach,
        }
    }

    pub fn from_latest_departure<M: Metric>(scan: &LatestDepartureScan<M>) -> Self {
        let reach = scan
            .reached_stops()
            .map(|(stop, link)| (*stop, scan.tree().time_of(link)))
            .collect();
        Self {
            direction: IsochroneDirection::TowardTarget,
            anchor: *scan.target(),
            window: *scan.window(),
            reach,
        }
    }

    pub fn direction(&self) -> IsochroneDirection {
        self.direction
    }

    /// The stop the originating scan was anchored at.
    pub fn anchor(&self) -> &StopId {
        &self.anchor
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn nb_of_reached_stops(&self) -> usize {
        self.reach.len()
    }

    /// The reach time of `stop`, or `None` when the originating scan
    /// never reached it.
    pub fn reach_time(&self, stop: &StopId) -> Option<SecondsSinceEpoch> {
        self.reach.get(stop).copied()
    }

    /// Whether `stop` is inside the isochrone at `time`.
    ///
    /// Panics when `time` lies outside the originating scan's window :
    /// the filter holds no answer there.
    pub fn is_reachable(&self, stop: &StopId, time: &SecondsSinceEpoch) -> bool {
        assert!(
            self.window.contains(time),
            "isochrone for window {} queried at {}",
            self.window,
            time
        );
        match (self.direction, self.reach.get(stop)) {
            (_, None) => false,
            (IsochroneDirection::FromSource, Some(reached)) => *reached <= *time,
            (IsochroneDirection::TowardTarget, Some(reached)) => *reached >= *time,
        }
    }
}

impl ConnectionFilter for IsochroneFilter {
    fn can_be_taken(&self, _connection_id: &ConnectionId, connection: &Connection) -> bool {
        match self.direction {
            // the departure stop must be reached before the vehicle leaves
            IsochroneDirection::FromSource => self
                .reach
                .get(&connection.dep_stop)
                .map_or(false, |reached| *reached <= connection.departure_time),
            // the arrival stop must still allow reaching the anchor
            IsochroneDirection::TowardTarget => self
                .reach
                .get(&connection.arr_stop)
                .map_or(false, |reached| *reached >= connection.arrival_time()),
        }
    }

    fn check_window(&self, departure: SecondsSinceEpoch, arrival: SecondsSinceEpoch) {
        assert!(
            self.window.contains(&departure) && self.window.contains(&arrival),
            "isochrone for window {} used over [{}, {}]",
            self.window,
            departure,
            arrival
        );
    }
}
