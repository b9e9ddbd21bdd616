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
    identifiers::{ConnectionId, StopId, TripId},
    time::{PositiveDuration, SecondsSinceEpoch},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{Display, Formatter},
};

/// Boarding/alighting restrictions of a connection, stored as a small
/// flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConnectionMode {
    bits: u8,
}

impl ConnectionMode {
    pub const NORMAL: ConnectionMode = ConnectionMode { bits: 0 };
    /// Passengers may board at the departure stop but not alight at the
    /// arrival stop.
    pub const GET_ON_ONLY: ConnectionMode = ConnectionMode { bits: 1 };
    /// Passengers may alight at the arrival stop but not board at the
    /// departure stop.
    pub const GET_OFF_ONLY: ConnectionMode = ConnectionMode { bits: 2 };
    pub const CANCELLED: ConnectionMode = ConnectionMode { bits: 4 };

    pub fn with(self, other: ConnectionMode) -> ConnectionMode {
        ConnectionMode {
            bits: self.bits | other.bits,
        }
    }

    pub fn contains(&self, other: &ConnectionMode) -> bool {
        self.bits & other.bits == other.bits
    }

    pub fn is_cancelled(&self) -> bool {
        self.contains(&Self::CANCELLED)
    }

    pub fn can_get_on(&self) -> bool {
        !self.contains(&Self::GET_OFF_ONLY)
    }

    pub fn can_get_off(&self) -> bool {
        !self.contains(&Self::GET_ON_ONLY)
    }
}

impl Display for ConnectionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.bits == 0 {
            return write!(f, "normal");
        }
        let mut sep = "";
        for (flag, name) in [
            (Self::GET_ON_ONLY, "get_on_only"),
            (Self::GET_OFF_ONLY, "get_off_only"),
            (Self::CANCELLED, "cancelled"),
        ] {
            if self.contains(&flag) {
                write!(f, "{}{}", sep, name)?;
                sep = "|";
            }
        }
        Ok(())
    }
}

/// One vehicle movement between two consecutive stops of a trip.
///
/// `departure_time` already includes the departure delay, and the
/// arrival is `departure_time + travel_time`. The delay fields only
/// record how much of those instants is due to realtime updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub global_id: String,
    pub dep_stop: StopId,
    pub arr_stop: StopId,
    pub departure_time: SecondsSinceEpoch,
    pub travel_time: u16,
    pub departure_delay: u16,
    pub arrival_delay: u16,
    pub trip: TripId,
    pub mode: ConnectionMode,
}

impl Connection {
    pub fn arrival_time(&self) -> SecondsSinceEpoch {
        self.departure_time + PositiveDuration::from_seconds(u32::from(self.travel_time))
    }

    pub fn travel_duration(&self) -> PositiveDuration {
        PositiveDuration::from_seconds(u32::from(self.travel_time))
    }
}

/// All connections of one logical database.
///
/// Storage is append-only : connections live in per-tile buckets keyed
/// by the tile of their departure stop, in insertion order. On top of
/// that sits a departure-time-sorted view, rebuilt when a writer seals
/// its snapshot, which is what the scan enumerators walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsTable {
    database_id: u32,
    by_tile: BTreeMap<u32, Vec<Connection>>,
    by_departure: Vec<(SecondsSinceEpoch, ConnectionId)>,
    by_global_id: HashMap<String, ConnectionId>,
}

impl ConnectionsTable {
    pub(crate) fn new(database_id: u32) -> Self {
        Self {
            database_id,
            by_tile: BTreeMap::new(),
            by_departure: Vec::new(),
            by_global_id: HashMap::new(),
        }
    }

    pub fn database_id(&self) -> u32 {
        self.database_id
    }

    pub fn len(&self) -> usize {
        self.by_departure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_departure.is_empty()
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        if id.database_id != self.database_id {
            return None;
        }
        self.by_tile
            .get(&id.tile_id)
            .and_then(|bucket| bucket.get(id.local_id as usize))
    }

    /// Id of the first connection inserted with this global id.
    pub fn by_global_id(&self, global_id: &str) -> Option<ConnectionId> {
        self.by_global_id.get(global_id).copied()
    }

    /// All connections, tile bucket by tile bucket.
    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> {
        let database_id = self.database_id;
        self.by_tile.iter().flat_map(move |(tile_id, bucket)| {
            bucket.iter().enumerate().map(move |(local_id, connection)| {
                (
                    ConnectionId::new(database_id, *tile_id, local_id as u32),
                    connection,
                )
            })
        })
    }

    pub fn earliest_departure(&self) -> Option<SecondsSinceEpoch> {
        self.by_departure.first().map(|(time, _)| *time)
    }

    pub fn latest_departure(&self) -> Option<SecondsSinceEpoch> {
        self.by_departure.last().map(|(time, _)| *time)
    }

    /// A fresh cursor over the departure-time-sorted view.
    /// Cursors are cheap : any number of them can walk the same table.
    pub fn enumerator(&self) -> DepartureEnumerator<'_> {
        DepartureEnumerator {
            table: self,
            position: 0,
        }
    }

    /// Appends to the bucket of the departure stop's tile.
    /// The departure-sorted view is stale until the next `seal`.
    pub(crate) fn add(&mut self, connection: Connection) -> ConnectionId {
        let tile_id = connection.dep_stop.tile_id;
        let departure_time = connection.departure_time;
        let global_id = connection.global_id.clone();
        let bucket = self.by_tile.entry(tile_id).or_default();
        let id = ConnectionId::new(self.database_id, tile_id, bucket.len() as u32);
        bucket.push(connection);
        self.by_departure.push((departure_time, id));
        self.by_global_id.entry(global_id).or_insert(id);
        id
    }

    /// Rebuilds the departure-sorted view. Ties on the departure time
    /// are broken by connection id, so the order is deterministic.
    pub(crate) fn seal(&mut self) {
        self.by_departure.sort_by_key(|(time, id)| (*time, *id));
    }
}

/// Cursor over connections in departure-time order.
///
/// `next` walks toward later departures, `prev` toward earlier ones.
/// Seeking outside the stored range just lands the cursor on the
/// nearest boundary.
pub struct DepartureEnumerator<'table> {
    table: &'table ConnectionsTable,
    // index in by_departure of the connection `next` would yield
    position: usize,
}

impl<'table> DepartureEnumerator<'table> {
    /// After this call, `next` yields the first connection departing
    /// at or after `time`.
    pub fn move_to(&mut self, time: &SecondsSinceEpoch) {
        self.position = self
            .table
            .by_departure
            .partition_point(|(departure, _)| departure < time);
    }

    /// After this call, `prev` yields the last connection departing
    /// at or before `time`.
    pub fn move_to_latest(&mut self, time: &SecondsSinceEpoch) {
        self.position = self
            .table
            .by_departure
            .partition_point(|(departure, _)| departure <= time);
    }

    pub fn next(&mut self) -> Option<(ConnectionId, &'table Connection)> {
        let (_, id) = *self.table.by_departure.get(self.position)?;
        self.position += 1;
        let connection = self.table.get(&id);
        debug_assert!(connection.is_some(), "dangling connection id {}", id);
        connection.map(|connection| (id, connection))
    }

    pub fn prev(&mut self) -> Option<(ConnectionId, &'table Connection)> {
        self.position = self.position.checked_sub(1)?;
        let (_, id) = *self.table.by_departure.get(self.position)?;
        let connection = self.table.get(&id);
        debug_assert!(connection.is_some(), "dangling connection id {}", id);
        connection.map(|connection| (id, connection))
    }
}
