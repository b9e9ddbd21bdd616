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

//! Spatial lookup of places, bucketed by web-mercator tile.
//!
//! The index is the storage layout as much as it is a search structure :
//! adding a place assigns it a `(tile_id, local_id)` handle, and the stops
//! table reuses that handle as the tail of its `StopId`s.

use crate::tiles::{compute_distance, footprint, Coord, Tile, TileRect, MAX_ZOOM};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// `(tile_id, local_id)` of a place inside a `TiledIndex`.
pub type PlaceHandle = (u32, u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiledIndex<T> {
    zoom: u32,
    buckets: BTreeMap<u32, Vec<(Coord, T)>>,
}

impl<T> TiledIndex<T> {
    /// Panics if `zoom > MAX_ZOOM`.
    pub fn new(zoom: u32) -> Self {
        assert!(zoom <= MAX_ZOOM, "Unsupported tile zoom level {}", zoom);
        Self {
            zoom,
            buckets: BTreeMap::new(),
        }
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Stores `value` at `coord` and returns its handle.
    ///
    /// Local ids grow independently in each tile, so appending here
    /// never renumbers places stored in other tiles.
    pub fn add(&mut self, coord: Coord, value: T) -> PlaceHandle {
        let tile_id = Tile::covering(&coord, self.zoom).id();
        let bucket = self.buckets.entry(tile_id).or_default();
        let local_id = bucket.len() as u32;
        bucket.push((coord, value));
        (tile_id, local_id)
    }

    pub fn get(&self, handle: &PlaceHandle) -> Option<&T> {
        self.entry(handle).map(|(_, value)| value)
    }

    pub(crate) fn get_mut(&mut self, handle: &PlaceHandle) -> Option<&mut T> {
        let (tile_id, local_id) = *handle;
        self.buckets
            .get_mut(&tile_id)
            .and_then(|bucket| bucket.get_mut(local_id as usize))
            .map(|(_, value)| value)
    }

    pub fn coord(&self, handle: &PlaceHandle) -> Option<Coord> {
        self.entry(handle).map(|(coord, _)| *coord)
    }

    fn entry(&self, handle: &PlaceHandle) -> Option<&(Coord, T)> {
        let (tile_id, local_id) = *handle;
        self.buckets
            .get(&tile_id)
            .and_then(|bucket| bucket.get(local_id as usize))
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn nb_of_tiles(&self) -> usize {
        self.buckets.len()
    }

    /// All places, tile by tile in increasing tile id order.
    pub fn iter(&self) -> impl Iterator<Item = (PlaceHandle, &Coord, &T)> {
        self.buckets.iter().flat_map(|(tile_id, bucket)| {
            bucket
                .iter()
                .enumerate()
                .map(move |(local_id, (coord, value))| ((*tile_id, local_id as u32), coord, value))
        })
    }

    /// Lazily yields every place stored in a tile intersecting the
    /// rectangle spanned by the two corners.
    ///
    /// The query works at tile granularity : places of an intersecting
    /// tile are returned even when they fall slightly outside the exact
    /// coordinate rectangle.
    pub fn in_box(&self, north_west: &Coord, south_east: &Coord) -> PlacesInBox<'_, T> {
        let rect = TileRect::from_corners(north_west, south_east, self.zoom);
        PlacesInBox::new(self, rect)
    }

    /// All places within `radius_meters` of `center`, closest first.
    ///
    /// The tile footprint over-approximates, then every candidate is
    /// checked against the exact distance, so no place truly in range
    /// is ever missed and none beyond the radius is ever returned.
    pub fn in_range(&self, center: &Coord, radius_meters: f64) -> Vec<(PlaceHandle, f64)> {
        let rect = footprint(center, radius_meters, self.zoom);
        let mut result: Vec<(PlaceHandle, f64)> = Vec::new();
        for tile in rect.tiles() {
            let tile_id = tile.id();
            if let Some(bucket) = self.buckets.get(&tile_id) {
                for (local_id, (coord, _)) in bucket.iter().enumerate() {
                    let distance = compute_distance(center, coord);
                    if distance <= radius_meters {
                        result.push(((tile_id, local_id as u32), distance));
                    }
                }
            }
        }
        result.sort_by(|(_, lhs), (_, rhs)| lhs.total_cmp(rhs));
        result
    }
}

pub struct PlacesInBox<'index, T> {
    tiles: std::vec::IntoIter<(u32, &'index [(Coord, T)])>,
    current: Option<(u32, usize, &'index [(Coord, T)])>,
}

impl<'index, T> PlacesInBox<'index, T> {
    fn new(index: &'index TiledIndex<T>, rect: TileRect) -> Self {
        let tiles: Vec<(u32, &[(Coord, T)])> = rect
            .tiles()
            .filter_map(|tile| {
                let tile_id = tile.id();
                index
                    .buckets
                    .get(&tile_id)
                    .map(|bucket| (tile_id, bucket.as_slice()))
            })
            .collect();
        Self {
            tiles: tiles.into_iter(),
            current: None,
        }
    }
}

impl<'index, T> Iterator for PlacesInBox<'index, T> {
    type Item = (PlaceHandle, &'index Coord, &'index T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((tile_id, position, bucket)) = &mut self.current {
                if let Some((coord, value)) = bucket.get(*position) {
                    let handle = (*tile_id, *position as u32);
                    *position += 1;
                    return Some((handle, coord, value));
                }
            }
            let (tile_id, bucket) = self.tiles.next()?;
            self.current = Some((tile_id, 0, bucket));
        }
    }
}

/// Memoizes `in_range` results per exact `(center, radius)` query.
///
/// Transfer generation asks for the surroundings of the same stop over
/// and over during a scan, which makes even this naive keying worthwhile.
pub struct CachedPlacesNearby<'index, T> {
    index: &'index TiledIndex<T>,
    cache: HashMap<RangeQueryKey, Vec<(PlaceHandle, f64)>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RangeQueryKey {
    lon_bits: u64,
    lat_bits: u64,
    radius_bits: u64,
}

impl RangeQueryKey {
    fn new(center: &Coord, radius_meters: f64) -> Self {
        Self {
            lon_bits: center.lon.to_bits(),
            lat_bits: center.lat.to_bits(),
            radius_bits: radius_meters.to_bits(),
        }
    }
}

impl<'index, T> CachedPlacesNearby<'index, T> {
    pub fn new(index: &'index TiledIndex<T>) -> Self {
        Self {
            index,
            cache: HashMap::new(),
        }
    }

    pub fn in_range(&mut self, center: &Coord, radius_meters: f64) -> &[(PlaceHandle, f64)] {
        let index = self.index;
        self.cache
            .entry(RangeQueryKey::new(center, radius_meters))
            .or_insert_with(|| index.in_range(center, radius_meters))
    }

    pub fn nb_of_cached_queries(&self) -> usize {
        self.cache.len()
    }
}
