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

use crate::identifiers::TripId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub global_id: String,
    pub attributes: BTreeMap<String, String>,
}

/// All trips of one logical database.
///
/// A trip carries no geography, so unlike stops there is nothing to
/// bucket them by : they all live in the single tile `0`, and the
/// `local_id` is just their insertion rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripsTable {
    database_id: u32,
    trips: Vec<Trip>,
    by_global_id: HashMap<String, TripId>,
}

impl TripsTable {
    pub(crate) fn new(database_id: u32) -> Self {
        Self {
            database_id,
            trips: Vec::new(),
            by_global_id: HashMap::new(),
        }
    }

    pub fn database_id(&self) -> u32 {
        self.database_id
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn contains(&self, id: &TripId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &TripId) -> Option<&Trip> {
        if id.database_id != self.database_id || id.tile_id != 0 {
            return None;
        }
        self.trips.get(id.local_id as usize)
    }

    pub fn by_global_id(&self, global_id: &str) -> Option<TripId> {
        self.by_global_id.get(global_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TripId, &Trip)> {
        let database_id = self.database_id;
        self.trips
            .iter()
            .enumerate()
            .map(move |(local_id, trip)| (TripId::new(database_id, 0, local_id as u32), trip))
    }

    /// Returns the id of the trip and whether it was created by this call.
    /// Idempotent by global id, merging attributes on re-add.
    pub(crate) fn add_or_update(
        &mut self,
        global_id: &str,
        attributes: BTreeMap<String, String>,
    ) -> (TripId, bool) {
        if let Some(id) = self.by_global_id(global_id) {
            if let Some(trip) = self.trips.get_mut(id.local_id as usize) {
                trip.attributes.extend(attributes);
            }
            return (id, false);
        }
        let id = TripId::new(self.database_id, 0, self.trips.len() as u32);
        self.trips.push(Trip {
            global_id: global_id.to_string(),
            attributes,
        });
        self.by_global_id.insert(global_id.to_string(), id);
        (id, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_twice_returns_the_same_id() {
        let mut trips = TripsTable::new(0);
        let (first, created) = trips.add_or_update("trip:morning", BTreeMap::new());
        assert!(created);
        let (second, created) = trips.add_or_update("trip:morning", BTreeMap::new());
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(trips.len(), 1);
    }

    #[test]
    fn local_ids_follow_insertion_order() {
        let mut trips = TripsTable::new(0);
        let (first, _) = trips.add_or_update("trip:morning", BTreeMap::new());
        let (second, _) = trips.add_or_update("trip:evening", BTreeMap::new());
        assert_eq!(first.local_id, 0);
        assert_eq!(second.local_id, 1);
        assert_eq!(trips.by_global_id("trip:evening"), Some(second));
    }
}
