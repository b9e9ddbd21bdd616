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

//! Storage of one logical transit database.
//!
//! A `TransitData` is an immutable snapshot of the stops, trips and
//! connections tables. Readers grab the latest snapshot from a
//! `TransitDatabase` and keep scanning it for as long as they like,
//! while a `TransitDataWriter` prepares the next snapshot on the side
//! and publishes it atomically on close. Nothing is ever mutated in
//! place under a reader.

pub mod connections;
pub mod stops;
pub mod trips;
pub mod validation;

pub use connections::{Connection, ConnectionMode, ConnectionsTable, DepartureEnumerator};
pub use stops::{Stop, StopsTable};
pub use trips::{Trip, TripsTable};
pub use validation::{
    ConnectionRecord, ConnectionViolation, DefaultValidationPolicy, ValidationDecision,
    ValidationPolicy,
};

use crate::{
    config::StoreParams,
    identifiers::{ConnectionId, StopId, TripId},
    tiles::Coord,
    time::PositiveDuration,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
};
use tracing::info;

/// An immutable snapshot of one logical database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitData {
    database_id: u32,
    pub stops: StopsTable,
    pub trips: TripsTable,
    pub connections: ConnectionsTable,
}

impl TransitData {
    pub(crate) fn empty(database_id: u32, params: &StoreParams) -> Self {
        Self {
            database_id,
            stops: StopsTable::new(database_id, params.tile_zoom),
            trips: TripsTable::new(database_id),
            connections: ConnectionsTable::new(database_id),
        }
    }

    pub fn database_id(&self) -> u32 {
        self.database_id
    }
}

/// The handle through which snapshots of one logical database are
/// published and obtained.
///
/// Any number of readers can call `latest` concurrently. At most one
/// writer is open at a time : `write` blocks until the previous writer
/// has closed.
pub struct TransitDatabase {
    params: StoreParams,
    latest: RwLock<Arc<TransitData>>,
    writer_lock: Mutex<()>,
}

impl TransitDatabase {
    pub fn new(database_id: u32, params: StoreParams) -> Self {
        let data = TransitData::empty(database_id, &params);
        Self {
            params,
            latest: RwLock::new(Arc::new(data)),
            writer_lock: Mutex::new(()),
        }
    }

    /// Wraps an already built snapshot, typically one deserialized from
    /// a persisted byte stream.
    pub fn from_snapshot(data: TransitData, params: StoreParams) -> Self {
        Self {
            params,
            latest: RwLock::new(Arc::new(data)),
            writer_lock: Mutex::new(()),
        }
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<TransitData> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn write(&self) -> TransitDataWriter<'_, DefaultValidationPolicy> {
        self.write_with_policy(DefaultValidationPolicy)
    }

    pub fn write_with_policy<Policy: ValidationPolicy>(
        &self,
        policy: Policy,
    ) -> TransitDataWriter<'_, Policy> {
        let guard = self
            .writer_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let data = self.latest().as_ref().clone();
        TransitDataWriter {
            database: self,
            _writer_guard: guard,
            data,
            policy,
            stats: WriterStats::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct WriterStats {
    nb_of_new_stops: usize,
    nb_of_updated_stops: usize,
    nb_of_new_trips: usize,
    nb_of_connections: usize,
    nb_of_rejected_connections: usize,
}

/// Builds the next snapshot of a database.
///
/// The writer starts from a copy of the latest snapshot, so readers of
/// the previous one are never disturbed. Nothing is visible to new
/// readers until `close` publishes the whole snapshot at once.
pub struct TransitDataWriter<'db, Policy: ValidationPolicy = DefaultValidationPolicy> {
    database: &'db TransitDatabase,
    _writer_guard: MutexGuard<'db, ()>,
    data: TransitData,
    policy: Policy,
    stats: WriterStats,
}

impl<'db, Policy: ValidationPolicy> TransitDataWriter<'db, Policy> {
    /// Idempotent by global id : a second call with a known id returns
    /// the existing stop, merging the attributes.
    pub fn add_or_update_stop(
        &mut self,
        global_id: &str,
        coord: Coord,
        attributes: BTreeMap<String, String>,
    ) -> StopId {
        let (id, created) = self.data.stops.add_or_update(global_id, coord, attributes);
        if created {
            self.stats.nb_of_new_stops += 1;
        } else {
            self.stats.nb_of_updated_stops += 1;
        }
        id
    }

    /// Idempotent by global id, like `add_or_update_stop`.
    pub fn add_or_update_trip(
        &mut self,
        global_id: &str,
        attributes: BTreeMap<String, String>,
    ) -> TripId {
        let (id, created) = self.data.trips.add_or_update(global_id, attributes);
        if created {
            self.stats.nb_of_new_trips += 1;
        }
        id
    }

    /// Validates `record` and appends it to the connections table.
    ///
    /// The record runs through the delay repair of the validation
    /// policy, then through the consistency checks. The first violation
    /// the policy refuses to keep rejects the whole record and is
    /// returned as the error.
    pub fn add_or_update_connection(
        &mut self,
        record: ConnectionRecord,
    ) -> Result<ConnectionId, ConnectionViolation> {
        let mut record = record;
        self.policy.repair_delays(&mut record);

        if !self.data.stops.contains(&record.dep_stop) {
            let violation = ConnectionViolation::UnknownDepartureStop {
                stop: record.dep_stop,
            };
            self.decide(violation, &record)?;
        }
        if !self.data.stops.contains(&record.arr_stop) {
            let violation = ConnectionViolation::UnknownArrivalStop {
                stop: record.arr_stop,
            };
            self.decide(violation, &record)?;
        }
        if record.dep_stop == record.arr_stop
            && !self
                .database
                .params
                .validation
                .allow_same_stop_connections
        {
            let violation = ConnectionViolation::SameDepartureAndArrival {
                stop: record.dep_stop,
            };
            self.decide(violation, &record)?;
        }
        if self.data.connections.by_global_id(&record.global_id).is_some()
            && !self
                .database
                .params
                .validation
                .allow_duplicate_connection_ids
        {
            let violation = ConnectionViolation::DuplicateGlobalId {
                global_id: record.global_id.clone(),
            };
            self.decide(violation, &record)?;
        }

        let departure_time = record.effective_departure_time();
        let arrival_time = record.effective_arrival_time();
        let travel_time = match arrival_time.duration_since(&departure_time) {
            None => {
                let violation = ConnectionViolation::ArrivalBeforeDeparture {
                    departure_time,
                    arrival_time,
                };
                self.decide(violation, &record)?;
                // kept anyway : store an instantaneous hop
                0
            }
            Some(travel) if travel.total_seconds() > u64::from(u16::MAX) => {
                let violation = ConnectionViolation::TravelTimeTooLarge {
                    travel_seconds: travel.total_seconds(),
                };
                self.decide(violation, &record)?;
                u16::MAX
            }
            Some(travel) => travel.total_seconds() as u16,
        };

        let connection = Connection {
            global_id: record.global_id,
            dep_stop: record.dep_stop,
            arr_stop: record.arr_stop,
            departure_time,
            travel_time,
            departure_delay: record.departure_delay.unwrap_or(0),
            arrival_delay: record.arrival_delay.unwrap_or(0),
            trip: record.trip,
            mode: record.mode,
        };
        let id = self.data.connections.add(connection);
        self.stats.nb_of_connections += 1;
        Ok(id)
    }

    /// Copies every stop, trip and connection of `other` into this
    /// database, re-tagging the ids. Stops and trips already known by
    /// global id are merged, and imported connections go through the
    /// usual validation.
    pub fn import(&mut self, other: &TransitData) {
        let mut stop_ids: HashMap<StopId, StopId> = HashMap::new();
        for (old_id, stop) in other.stops.iter() {
            if let Some(coord) = other.stops.coord(&old_id) {
                let new_id =
                    self.add_or_update_stop(&stop.global_id, coord, stop.attributes.clone());
                stop_ids.insert(old_id, new_id);
            }
        }
        let mut trip_ids: HashMap<TripId, TripId> = HashMap::new();
        for (old_id, trip) in other.trips.iter() {
            let new_id = self.add_or_update_trip(&trip.global_id, trip.attributes.clone());
            trip_ids.insert(old_id, new_id);
        }
        for (_, connection) in other.connections.iter() {
            let departure_delay = PositiveDuration::from_seconds(u32::from(
                connection.departure_delay,
            ));
            let arrival_delay =
                PositiveDuration::from_seconds(u32::from(connection.arrival_delay));
            let record = ConnectionRecord {
                global_id: connection.global_id.clone(),
                dep_stop: stop_ids
                    .get(&connection.dep_stop)
                    .copied()
                    .unwrap_or(connection.dep_stop),
                arr_stop: stop_ids
                    .get(&connection.arr_stop)
                    .copied()
                    .unwrap_or(connection.arr_stop),
                // stored times are the effective ones : peel the delays
                // off so that re-applying them round-trips
                departure_time: connection
                    .departure_time
                    .checked_sub(departure_delay)
                    .unwrap_or(connection.departure_time),
                arrival_time: connection
                    .arrival_time()
                    .checked_sub(arrival_delay)
                    .unwrap_or_else(|| connection.arrival_time()),
                departure_delay: Some(connection.departure_delay),
                arrival_delay: Some(connection.arrival_delay),
                trip: trip_ids
                    .get(&connection.trip)
                    .copied()
                    .unwrap_or(connection.trip),
                mode: connection.mode,
            };
            let _ = self.add_or_update_connection(record);
        }
        info!(
            "Imported database {} into database {}",
            other.database_id(),
            self.data.database_id()
        );
    }

    /// Read view of the snapshot under construction.
    pub fn data(&self) -> &TransitData {
        &self.data
    }

    /// Seals the snapshot and publishes it as the latest one.
    pub fn close(self) -> Arc<TransitData> {
        let TransitDataWriter {
            database,
            _writer_guard,
            mut data,
            stats,
            ..
        } = self;
        data.connections.seal();
        info!(
            "Database {} : sealed a snapshot with {} stops ({} new, {} updated), {} trips ({} new), {} connections ({} added, {} rejected)",
            data.database_id(),
            data.stops.len(),
            stats.nb_of_new_stops,
            stats.nb_of_updated_stops,
            data.trips.len(),
            stats.nb_of_new_trips,
            data.connections.len(),
            stats.nb_of_connections,
            stats.nb_of_rejected_connections,
        );
        let snapshot = Arc::new(data);
        *database
            .latest
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        snapshot
    }

    fn decide(
        &mut self,
        violation: ConnectionViolation,
        record: &ConnectionRecord,
    ) -> Result<(), ConnectionViolation> {
        match self.policy.on_violation(&violation, record) {
            ValidationDecision::Keep => Ok(()),
            ValidationDecision::Drop => {
                self.stats.nb_of_rejected_connections += 1;
                Err(violation)
            }
        }
    }
}
