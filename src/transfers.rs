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

//! Footpaths between stops.
//!
//! The scans never compute a walking route themselves : they ask a
//! [`TransferGenerator`] how long a footpath takes, and whoever builds
//! the scan decides where those durations come from. The two
//! generators below cover the common cases ; a road-network router
//! would implement the same trait.

use crate::{
    config::TransferParams,
    identifiers::StopId,
    time::PositiveDuration,
    tiles::compute_distance,
    transit_data::TransitData,
};
use std::collections::HashMap;

pub trait TransferGenerator {
    /// Walking duration from `from` to `to`, or `None` when no footpath
    /// exists. `from == to` asks for the same-stop interchange time.
    fn time_between(
        &self,
        data: &TransitData,
        from: &StopId,
        to: &StopId,
    ) -> Option<PositiveDuration>;

    /// Walking durations from `from` to each stop of `tos`. Stops
    /// without a footpath are absent from the result.
    fn times_between(
        &self,
        data: &TransitData,
        from: &StopId,
        tos: &[StopId],
    ) -> HashMap<StopId, PositiveDuration> {
        tos.iter()
            .filter_map(|to| {
                self.time_between(data, from, to)
                    .map(|duration| (*to, duration))
            })
            .collect()
    }

    /// Every *other* stop reachable on foot from `from`, with its
    /// walking duration.
    fn reachable_from(&self, data: &TransitData, from: &StopId) -> Vec<(StopId, PositiveDuration)>;

    /// Furthest distance, in meters, a footpath of this generator may
    /// cover. Zero means walking never leaves the stop.
    fn max_range_meters(&self) -> f64;
}

/// Changing vehicles is only possible without leaving the stop.
#[derive(Debug, Clone, Copy)]
pub struct SameStopTransfers {
    interchange: PositiveDuration,
}

impl SameStopTransfers {
    pub fn new(interchange: PositiveDuration) -> Self {
        Self { interchange }
    }
}

impl Default for SameStopTransfers {
    fn default() -> Self {
        Self::new(PositiveDuration::zero())
    }
}

impl TransferGenerator for SameStopTransfers {
    fn time_between(
        &self,
        _data: &TransitData,
        from: &StopId,
        to: &StopId,
    ) -> Option<PositiveDuration> {
        if from == to {
            Some(self.interchange)
        } else {
            None
        }
    }

    fn reachable_from(
        &self,
        _data: &TransitData,
        _from: &StopId,
    ) -> Vec<(StopId, PositiveDuration)> {
        Vec::new()
    }

    fn max_range_meters(&self) -> f64 {
        0.0
    }
}

/// Walk in a straight line at constant speed, up to a maximum
/// distance. Durations are rounded up to the next second.
#[derive(Debug, Clone, Copy)]
pub struct CrowsFlightTransfers {
    walking_speed: f64,
    max_walking_distance: f64,
    same_stop_interchange: PositiveDuration,
}

impl CrowsFlightTransfers {
    pub fn new(params: &TransferParams) -> Self {
        debug_assert!(params.walking_speed > 0.0);
        Self {
            walking_speed: params.walking_speed,
            max_walking_distance: params.max_walking_distance,
            same_stop_interchange: params.same_stop_interchange,
        }
    }

    fn duration_of(&self, distance_meters: f64) -> PositiveDuration {
        let seconds = (distance_meters / self.walking_speed).ceil() as u32;
        PositiveDuration::from_seconds(seconds)
    }
}

impl Default for CrowsFlightTransfers {
    fn default() -> Self {
        Self::new(&TransferParams::default())
    }
}

impl TransferGenerator for CrowsFlightTransfers {
    fn time_between(
        &self,
        data: &TransitData,
        from: &StopId,
        to: &StopId,
    ) -> Option<PositiveDuration> {
        if from == to {
            return Some(self.same_stop_interchange);
        }
        let from_coord = data.stops.coord(from)?;
        let to_coord = data.stops.coord(to)?;
        let distance = compute_distance(&from_coord, &to_coord);
        if distance <= self.max_walking_distance {
            Some(self.duration_of(distance))
        } else {
            None
        }
    }

    fn reachable_from(&self, data: &TransitData, from: &StopId) -> Vec<(StopId, PositiveDuration)> {
        let center = match data.stops.coord(from) {
            Some(coord) => coord,
            None => return Vec::new(),
        };
        data.stops
            .in_range(&center, self.max_walking_distance)
            .into_iter()
            .filter(|(stop, _)| stop != from)
            .map(|(stop, distance)| (stop, self.duration_of(distance)))
            .collect()
    }

    fn max_range_meters(&self) -> f64 {
        self.max_walking_distance
    }
}
