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

#![allow(dead_code)]

use sleipnir::{
    identifiers::{ConnectionId, StopId, TripId},
    tiles::Coord,
    time::{PositiveDuration, SecondsSinceEpoch, TimeWindow},
    transit_data::{ConnectionMode, ConnectionRecord, TransitData, TransitDatabase},
    StoreParams,
};
use std::{collections::BTreeMap, str::FromStr, sync::Arc};

pub fn init_logger() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Midnight of the day every test timetable runs on, 2020-01-01 UTC.
pub const MIDNIGHT: SecondsSinceEpoch = SecondsSinceEpoch::from_unix_seconds(1_577_836_800);

/// The instant "hh:mm:ss" of the test day.
pub fn at(time: &str) -> SecondsSinceEpoch {
    MIDNIGHT + duration(time)
}

pub fn duration(string: &str) -> PositiveDuration {
    PositiveDuration::from_str(string)
        .unwrap_or_else(|_| panic!("bad duration literal {}", string))
}

pub fn window(start: &str, end: &str) -> TimeWindow {
    TimeWindow::new(at(start), at(end))
}

struct PendingConnection {
    global_id: String,
    trip: String,
    from: String,
    departure: String,
    to: String,
    arrival: String,
    mode: ConnectionMode,
}

/// Declares a small timetable and seals it into a snapshot.
///
/// Stops referenced by a trip without an explicit `stop` call are
/// placed on a west-east line roughly 2km apart, far beyond the default
/// crow's flight walking range. Tests about footpaths place their stops
/// explicitly.
pub struct NetworkBuilder {
    params: StoreParams,
    placed: Vec<(String, Coord)>,
    connections: Vec<PendingConnection>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::with_params(StoreParams::default())
    }

    pub fn with_params(params: StoreParams) -> Self {
        Self {
            params,
            placed: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn stop(mut self, name: &str, lon: f64, lat: f64) -> Self {
        self.placed.push((name.to_string(), Coord::new(lon, lat)));
        self
    }

    /// One vehicle journey : every consecutive pair of stop times
    /// becomes a connection named "{trip}:{rank}", rank counting from 0.
    pub fn trip(mut self, trip: &str, stop_times: &[(&str, &str)]) -> Self {
        assert!(
            stop_times.len() >= 2,
            "a trip needs at least two stop times"
        );
        for pair in stop_times.windows(2) {
            let (from, departure) = pair[0];
            let (to, arrival) = pair[1];
            self = self.connection(trip, (from, departure), (to, arrival), ConnectionMode::NORMAL);
        }
        self
    }

    /// A single connection, with explicit boarding restrictions.
    pub fn connection(
        mut self,
        trip: &str,
        (from, departure): (&str, &str),
        (to, arrival): (&str, &str),
        mode: ConnectionMode,
    ) -> Self {
        let rank = self
            .connections
            .iter()
            .filter(|pending| pending.trip == trip)
            .count();
        self.connections.push(PendingConnection {
            global_id: format!("{}:{}", trip, rank),
            trip: trip.to_string(),
            from: from.to_string(),
            departure: departure.to_string(),
            to: to.to_string(),
            arrival: arrival.to_string(),
            mode,
        });
        self
    }

    pub fn build(self) -> Network {
        let database = TransitDatabase::new(0, self.params);
        {
            let mut writer = database.write();
            let mut known: BTreeMap<String, StopId> = BTreeMap::new();
            for (name, coord) in &self.placed {
                let id = writer.add_or_update_stop(name, *coord, BTreeMap::new());
                known.insert(name.clone(), id);
            }
            let mut nb_of_auto_placed = 0_u32;
            for pending in &self.connections {
                let dep_stop =
                    ensure_stop(&mut writer, &mut known, &mut nb_of_auto_placed, &pending.from);
                let arr_stop =
                    ensure_stop(&mut writer, &mut known, &mut nb_of_auto_placed, &pending.to);
                let trip = writer.add_or_update_trip(&pending.trip, BTreeMap::new());
                let record = ConnectionRecord {
                    global_id: pending.global_id.clone(),
                    dep_stop,
                    arr_stop,
                    departure_time: at(&pending.departure),
                    arrival_time: at(&pending.arrival),
                    departure_delay: None,
                    arrival_delay: None,
                    trip,
                    mode: pending.mode,
                };
                if let Err(violation) = writer.add_or_update_connection(record) {
                    panic!("connection {} rejected : {}", pending.global_id, violation);
                }
            }
            writer.close();
        }
        let data = database.latest();
        Network { database, data }
    }
}

fn ensure_stop(
    writer: &mut sleipnir::TransitDataWriter<'_>,
    known: &mut BTreeMap<String, StopId>,
    nb_of_auto_placed: &mut u32,
    name: &str,
) -> StopId {
    if let Some(id) = known.get(name) {
        return *id;
    }
    // Lyon area, far from the explicitly placed Paris stops of the
    // footpath tests.
    let coord = Coord::new(4.80 + 0.03 * f64::from(*nb_of_auto_placed), 45.75);
    *nb_of_auto_placed += 1;
    let id = writer.add_or_update_stop(name, coord, BTreeMap::new());
    known.insert(name.to_string(), id);
    id
}

/// A sealed snapshot plus the database it came from, so a test can
/// reopen a writer for realtime style updates and refresh.
pub struct Network {
    pub database: TransitDatabase,
    pub data: Arc<TransitData>,
}

impl Network {
    pub fn stop(&self, name: &str) -> StopId {
        self.data
            .stops
            .by_global_id(name)
            .unwrap_or_else(|| panic!("no stop named {}", name))
    }

    pub fn trip(&self, name: &str) -> TripId {
        self.data
            .trips
            .by_global_id(name)
            .unwrap_or_else(|| panic!("no trip named {}", name))
    }

    /// Looks up a connection by its builder-assigned "{trip}:{rank}" id.
    pub fn connection(&self, global_id: &str) -> ConnectionId {
        self.data
            .connections
            .by_global_id(global_id)
            .unwrap_or_else(|| panic!("no connection named {}", global_id))
    }

    /// Replaces the held snapshot with the latest published one.
    pub fn refresh(&mut self) {
        self.data = self.database.latest();
    }
}
