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

//! Restrict what a scan may use.
//!
//! A [`ConnectionFilter`] is consulted on every connection a scan
//! considers : returning false forbids taking it. Filters compose with
//! [`FilterAggregator`] (logical and). A [`JourneyFilter`] instead
//! rejects complete journeys after the fact, typically to thin out a
//! profile before answering.

use crate::{
    criteria::BasicMetric,
    identifiers::ConnectionId,
    time::SecondsSinceEpoch,
    transit_data::Connection,
};

/// Vehicle-count bound used by [`MaxVehiclesFilter::default`].
pub const DEFAULT_MAX_NB_OF_VEHICLES: u32 = 10;

pub trait ConnectionFilter {
    /// False forbids the scan to take this connection.
    fn can_be_taken(&self, connection_id: &ConnectionId, connection: &Connection) -> bool;

    /// Scans announce their time window before the first call to
    /// `can_be_taken`. A filter that is only valid over some window
    /// must panic when asked about a window it does not cover :
    /// answering anyway would silently turn "I do not know" into
    /// "unreachable".
    fn check_window(&self, departure: SecondsSinceEpoch, arrival: SecondsSinceEpoch) {
        let _ = (departure, arrival);
    }
}

/// Lets everything through.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl ConnectionFilter for NoFilter {
    fn can_be_taken(&self, _connection_id: &ConnectionId, _connection: &Connection) -> bool {
        true
    }
}

/// Rejects connections flagged cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelledConnectionFilter;

impl ConnectionFilter for CancelledConnectionFilter {
    fn can_be_taken(&self, _connection_id: &ConnectionId, connection: &Connection) -> bool {
        !connection.mode.is_cancelled()
    }
}

/// Conjunction of filters. Window checks reach every member.
#[derive(Default)]
pub struct FilterAggregator<'filter> {
    filters: Vec<&'filter dyn ConnectionFilter>,
}

impl<'filter> FilterAggregator<'filter> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    pub fn with(mut self, filter: &'filter dyn ConnectionFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn nb_of_filters(&self) -> usize {
        self.filters.len()
    }
}

impl ConnectionFilter for FilterAggregator<'_> {
    fn can_be_taken(&self, connection_id: &ConnectionId, connection: &Connection) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.can_be_taken(connection_id, connection))
    }

    fn check_window(&self, departure: SecondsSinceEpoch, arrival: SecondsSinceEpoch) {
        for filter in &self.filters {
            filter.check_window(departure, arrival);
        }
    }
}

/// Post-hoc filter over complete journeys, judged by their metric.
pub trait JourneyFilter<M> {
    fn keep_journey(&self, metric: &M) -> bool;
}

/// Rejects journeys taking more vehicles than the bound allows.
#[derive(Debug, Clone, Copy)]
pub struct MaxVehiclesFilter {
    pub max_nb_of_vehicles: u32,
}

impl Default for MaxVehiclesFilter {
    fn default() -> Self {
        Self {
            max_nb_of_vehicles: DEFAULT_MAX_NB_OF_VEHICLES,
        }
    }
}

impl From<&crate::config::ScanParams> for MaxVehiclesFilter {
    fn from(params: &crate::config::ScanParams) -> Self {
        Self {
            max_nb_of_vehicles: params.max_nb_of_vehicles,
        }
    }
}

impl JourneyFilter<BasicMetric> for MaxVehiclesFilter {
    fn keep_journey(&self, metric: &BasicMetric) -> bool {
        metric.nb_of_vehicles <= self.max_nb_of_vehicles
    }
}
