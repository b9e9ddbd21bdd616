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

use crate::{
    identifiers::StopId,
    places_nearby::TiledIndex,
    tiles::Coord,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub global_id: String,
    pub attributes: BTreeMap<String, String>,
}

/// All stops of one logical database, bucketed by the tile containing
/// their coordinate. The `(tile_id, local_id)` handle assigned by the
/// tiled index is the tail of the public `StopId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopsTable {
    database_id: u32,
    places: TiledIndex<Stop>,
    by_global_id: HashMap<String, StopId>,
}

impl StopsTable {
    pub(crate) fn new(database_id: u32, zoom: u32) -> Self {
        Self {
            database_id,
            places: TiledIndex::new(zoom),
            by_global_id: HashMap::new(),
        }
    }

    pub fn database_id(&self) -> u32 {
        self.database_id
    }

    pub fn zoom(&self) -> u32 {
        self.places.zoom()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn contains(&self, id: &StopId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &StopId) -> Option<&Stop> {
        if id.database_id != self.database_id {
            return None;
        }
        self.places.get(&(id.tile_id, id.local_id))
    }

    pub fn coord(&self, id: &StopId) -> Option<Coord> {
        if id.database_id != self.database_id {
            return None;
        }
        self.places.coord(&(id.tile_id, id.local_id))
    }

    pub fn by_global_id(&self, global_id: &str) -> Option<StopId> {
        self.by_global_id.get(global_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StopId, &Stop)> {
        let database_id = self.database_id;
        self.places
            .iter()
            .map(move |((tile_id, local_id), _, stop)| {
                (StopId::new(database_id, tile_id, local_id), stop)
            })
    }

    /// Stops within `radius_meters` of `center`, closest first.
    pub fn in_range(&self, center: &Coord, radius_meters: f64) -> Vec<(StopId, f64)> {
        self.places
            .in_range(center, radius_meters)
            .into_iter()
            .map(|((tile_id, local_id), distance)| {
                (
                    StopId::new(self.database_id, tile_id, local_id),
                    distance,
                )
            })
            .collect()
    }

    /// Stops stored in any tile intersecting the given rectangle.
    pub fn in_box<'a>(
        &'a self,
        north_west: &Coord,
        south_east: &Coord,
    ) -> impl Iterator<Item = (StopId, &'a Stop)> {
        let database_id = self.database_id;
        self.places
            .in_box(north_west, south_east)
            .map(move |((tile_id, local_id), _, stop)| {
                (StopId::new(database_id, tile_id, local_id), stop)
            })
    }

    /// The underlying tiled index, mostly useful to wrap it in a
    /// `CachedPlacesNearby`.
    pub fn places(&self) -> &TiledIndex<Stop> {
        &self.places
    }

    /// Returns the id of the stop and whether it was created by this call.
    /// A second call with an already known global id does not create a
    /// second stop : the attributes are merged into the existing ones and
    /// the stored coordinate is left untouched.
    pub(crate) fn add_or_update(
        &mut self,
        global_id: &str,
        coord: Coord,
        attributes: BTreeMap<String, String>,
    ) -> (StopId, bool) {
        if let Some(id) = self.by_global_id(global_id) {
            let handle = (id.tile_id, id.local_id);
            if let Some(stop) = self.places.get_mut(&handle) {
                stop.attributes.extend(attributes);
            }
            return (id, false);
        }
        let stop = Stop {
            global_id: global_id.to_string(),
            attributes,
        };
        let (tile_id, local_id) = self.places.add(coord, stop);
        let id = StopId::new(self.database_id, tile_id, local_id);
        self.by_global_id.insert(global_id.to_string(), id);
        (id, true)
    }
}
