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

use crate::time::PositiveDuration;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Parameters fixed at database creation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoreParams {
    /// zoom level of the tiles used to bucket stops geographically
    #[serde(default = "default_tile_zoom")]
    pub tile_zoom: u32,

    #[serde(default)]
    pub validation: ValidationParams,
}

/// Which suspicious connections are considered valid at ingestion.
/// What happens to the invalid ones is decided by the writer's
/// `ValidationPolicy`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationParams {
    /// accept connections departing from and arriving at the same stop
    #[serde(default)]
    pub allow_same_stop_connections: bool,

    /// accept several connections sharing one global id
    #[serde(default)]
    pub allow_duplicate_connection_ids: bool,
}

pub fn default_tile_zoom() -> u32 {
    14
}

impl Default for StoreParams {
    fn default() -> Self {
        Self {
            tile_zoom: default_tile_zoom(),
            validation: ValidationParams::default(),
        }
    }
}

impl Display for StoreParams {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "--tile_zoom {} --allow_same_stop_connections {} --allow_duplicate_connection_ids {}",
            self.tile_zoom,
            self.validation.allow_same_stop_connections,
            self.validation.allow_duplicate_connection_ids
        )
    }
}

/// Parameters bounding one scan.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct ScanParams {
    /// longest time window a scan is allowed to sweep, see
    /// [`TimeWindow::truncated_to`](crate::time::TimeWindow::truncated_to)
    #[serde(default = "default_max_window_duration")]
    pub max_window_duration: PositiveDuration,

    /// journeys riding more vehicles than this are not worth reporting
    #[serde(default = "default_max_nb_of_vehicles")]
    pub max_nb_of_vehicles: u32,
}

pub fn default_max_window_duration() -> PositiveDuration {
    PositiveDuration::from_hms(24, 0, 0)
}

pub fn default_max_nb_of_vehicles() -> u32 {
    crate::filters::DEFAULT_MAX_NB_OF_VEHICLES
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            max_window_duration: default_max_window_duration(),
            max_nb_of_vehicles: default_max_nb_of_vehicles(),
        }
    }
}

impl Display for ScanParams {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "--max_window_duration {} --max_nb_of_vehicles {}",
            self.max_window_duration, self.max_nb_of_vehicles
        )
    }
}

/// Parameters of crow's flight transfer generation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct TransferParams {
    /// walking speed, in meters per second
    #[serde(default = "default_walking_speed")]
    pub walking_speed: f64,

    /// furthest distance a transfer may cover, in meters
    #[serde(default = "default_max_walking_distance")]
    pub max_walking_distance: f64,

    /// time needed to change vehicles without leaving the stop
    #[serde(default = "default_same_stop_interchange")]
    pub same_stop_interchange: PositiveDuration,
}

pub fn default_walking_speed() -> f64 {
    1.4
}

pub fn default_max_walking_distance() -> f64 {
    500.0
}

pub fn default_same_stop_interchange() -> PositiveDuration {
    PositiveDuration::from_hms(0, 0, 0)
}

impl Default for TransferParams {
    fn default() -> Self {
        Self {
            walking_speed: default_walking_speed(),
            max_walking_distance: default_max_walking_distance(),
            same_stop_interchange: default_same_stop_interchange(),
        }
    }
}

impl Display for TransferParams {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "--walking_speed {} --max_walking_distance {} --same_stop_interchange {}",
            self.walking_speed, self.max_walking_distance, self.same_stop_interchange
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied_to_missing_fields() {
        let params: StoreParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.tile_zoom, 14);
        assert!(!params.validation.allow_same_stop_connections);

        let params: StoreParams =
            serde_json::from_str(r#"{"validation": {"allow_same_stop_connections": true}}"#)
                .unwrap();
        assert_eq!(params.tile_zoom, 14);
        assert!(params.validation.allow_same_stop_connections);
        assert!(!params.validation.allow_duplicate_connection_ids);
    }

    #[test]
    fn transfer_defaults() {
        let params = TransferParams::default();
        assert!((params.walking_speed - 1.4).abs() < 1e-9);
        assert!((params.max_walking_distance - 500.0).abs() < 1e-9);
        assert!(params.same_stop_interchange.is_zero());
    }

    #[test]
    fn scan_defaults() {
        let params: ScanParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.max_window_duration, PositiveDuration::from_hms(24, 0, 0));
        assert_eq!(params.max_nb_of_vehicles, 10);

        let params: ScanParams =
            serde_json::from_str(r#"{"max_nb_of_vehicles": 3}"#).unwrap();
        assert_eq!(params.max_nb_of_vehicles, 3);
        assert_eq!(params.max_window_duration, PositiveDuration::from_hms(24, 0, 0));
    }
}
