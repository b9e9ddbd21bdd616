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

//! Web-mercator tile arithmetic used to bucket stops geographically.
//!
//! Tiles follow the usual slippy-map scheme : at a given zoom level the
//! world is cut into `2^zoom * 2^zoom` squares, `x` growing eastward from
//! longitude -180 and `y` growing southward from the north mercator bound.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use std::fmt::{Display, Formatter};

/// Highest zoom level supported by the tile id packing below.
/// At zoom 16 a packed `(x, y)` pair still fits in a `u32`.
pub const MAX_ZOOM: u32 = 16;

const_assert!(2 * MAX_ZOOM <= 32);

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// mercator is undefined at the poles
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// A geographic coordinate, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

impl Coord {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl Display for Coord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{};{}", self.lon, self.lat)
    }
}

/// Distance in meters between two coordinates, using the equirectangular
/// approximation. Good to a fraction of a percent at the scale of a
/// transit network, and much cheaper than the haversine formula.
pub fn compute_distance(from: &Coord, to: &Coord) -> f64 {
    let mean_lat = 0.5 * (from.lat + to.lat);
    let x = (to.lon - from.lon).to_radians() * mean_lat.to_radians().cos();
    let y = (to.lat - from.lat).to_radians();
    EARTH_RADIUS_METERS * (x * x + y * y).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub zoom: u32,
}

impl Tile {
    /// The tile containing `coord` at `zoom`.
    ///
    /// Panics if `zoom > MAX_ZOOM`. Latitudes beyond the mercator
    /// bounds are clamped into range.
    pub fn covering(coord: &Coord, zoom: u32) -> Tile {
        assert!(zoom <= MAX_ZOOM, "Unsupported tile zoom level {}", zoom);
        let nb_of_tiles = f64::from(side_length(zoom));
        let lat = coord.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let lat_rad = lat.to_radians();

        let x = (coord.lon + 180.0) / 360.0 * nb_of_tiles;
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
            * nb_of_tiles;

        let max_coord = side_length(zoom) - 1;
        Tile {
            x: (x.floor() as i64).clamp(0, i64::from(max_coord)) as u32,
            y: (y.floor() as i64).clamp(0, i64::from(max_coord)) as u32,
            zoom,
        }
    }

    /// Packs `(x, y)` into the single `u32` used as a storage bucket key.
    pub fn id(&self) -> u32 {
        (self.y << self.zoom) | self.x
    }

    pub fn from_id(id: u32, zoom: u32) -> Tile {
        assert!(zoom <= MAX_ZOOM, "Unsupported tile zoom level {}", zoom);
        let mask = side_length(zoom) - 1;
        Tile {
            x: id & mask,
            y: id >> zoom,
            zoom,
        }
    }

    /// Width of this tile in meters, at its own latitude.
    /// Flat-earth approximation, used only to size search footprints.
    pub fn width_meters(&self) -> f64 {
        let nb_of_tiles = f64::from(side_length(self.zoom));
        let lat = center_latitude(self.y, self.zoom);
        2.0 * std::f64::consts::PI * EARTH_RADIUS_METERS * lat.to_radians().cos() / nb_of_tiles
    }
}

impl Display for Tile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

fn side_length(zoom: u32) -> u32 {
    1u32 << zoom
}

fn center_latitude(y: u32, zoom: u32) -> f64 {
    let nb_of_tiles = f64::from(side_length(zoom));
    let n = std::f64::consts::PI * (1.0 - 2.0 * (f64::from(y) + 0.5) / nb_of_tiles);
    n.sinh().atan().to_degrees()
}

/// The rectangle of tiles that may contain a point within `radius_meters`
/// of `center`. Over-approximates on purpose : callers refine with
/// `compute_distance`, so a too-wide footprint only costs time, while a
/// too-narrow one would lose results.
pub fn footprint(center: &Coord, radius_meters: f64, zoom: u32) -> TileRect {
    let lat = center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let delta_lat = (radius_meters / EARTH_RADIUS_METERS).to_degrees();
    // widen toward the poles, where a degree of longitude shrinks
    let shrink = lat.to_radians().cos().max(0.01);
    let delta_lon = delta_lat / shrink;

    let north_west = Coord::new(center.lon - delta_lon, lat + delta_lat);
    let south_east = Coord::new(center.lon + delta_lon, lat - delta_lat);
    TileRect::from_corners(&north_west, &south_east, zoom)
}

/// An inclusive rectangle of tiles at a fixed zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
    pub zoom: u32,
}

impl TileRect {
    /// Rectangle spanning from the tile of the north-west corner to the
    /// tile of the south-east corner.
    pub fn from_corners(north_west: &Coord, south_east: &Coord, zoom: u32) -> TileRect {
        let top_left = Tile::covering(north_west, zoom);
        let bottom_right = Tile::covering(south_east, zoom);
        TileRect {
            min_x: top_left.x.min(bottom_right.x),
            max_x: top_left.x.max(bottom_right.x),
            min_y: top_left.y.min(bottom_right.y),
            max_y: top_left.y.max(bottom_right.y),
            zoom,
        }
    }

    pub fn contains(&self, tile: &Tile) -> bool {
        debug_assert!(tile.zoom == self.zoom);
        self.min_x <= tile.x && tile.x <= self.max_x && self.min_y <= tile.y && tile.y <= self.max_y
    }

    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        (self.min_y..=self.max_y).flat_map(move |y| {
            (self.min_x..=self.max_x).map(move |x| Tile {
                x,
                y,
                zoom: self.zoom,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_of_null_island() {
        let tile = Tile::covering(&Coord::new(0.0, 0.0), 14);
        assert_eq!(tile.x, 8192);
        assert_eq!(tile.y, 8192);
    }

    #[test]
    fn tile_of_paris() {
        // 14/8299/5636 covers central Paris
        let tile = Tile::covering(&Coord::new(2.3522, 48.8566), 14);
        assert_eq!(tile.x, 8299);
        assert_eq!(tile.y, 5636);
    }

    #[test]
    fn tile_id_round_trips() {
        let tile = Tile::covering(&Coord::new(2.3522, 48.8566), 14);
        assert_eq!(Tile::from_id(tile.id(), 14), tile);
    }

    #[test]
    fn one_hundredth_of_a_latitude_degree() {
        let from = Coord::new(2.0, 48.0);
        let to = Coord::new(2.0, 48.01);
        let distance = compute_distance(&from, &to);
        assert!(distance > 1111.0 && distance < 1113.0, "{}", distance);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coord::new(2.3499, 48.8530);
        let b = Coord::new(2.3364, 48.8606);
        let there = compute_distance(&a, &b);
        let back = compute_distance(&b, &a);
        assert!((there - back).abs() < 1e-9);
        assert!(there > 1200.0 && there < 1400.0, "{}", there);
    }

    #[test]
    fn footprint_reaches_neighbor_tiles() {
        let center = Coord::new(2.3522, 48.8566);
        let rect = footprint(&center, 500.0, 14);
        let center_tile = Tile::covering(&center, 14);
        assert!(rect.contains(&center_tile));
        // a zoom 14 tile is ~1.6km wide at this latitude, so 500m
        // around a point can spill over to the neighbors at most
        assert!(rect.max_x - rect.min_x <= 2);
        assert!(rect.max_y - rect.min_y <= 2);

        // a point 400m east must stay inside the footprint
        let east = Coord::new(2.3522 + 400.0 / 73_000.0, 48.8566);
        assert!(rect.contains(&Tile::covering(&east, 14)));
    }
}
