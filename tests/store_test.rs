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

mod utils;

use anyhow::{format_err, Error};
use sleipnir::{
    earliest_arrival,
    tiles::Coord,
    transit_data::{ConnectionMode, ConnectionRecord},
    BasicComparator, BasicMetric, NoFilter, SameStopTransfers,
};
use std::collections::BTreeMap;
use utils::{at, window, NetworkBuilder};

#[test]
fn a_running_reader_keeps_its_snapshot() -> Result<(), Error> {
    utils::init_logger();
    let mut network = NetworkBuilder::new()
        .trip("slow", &[("A", "10:00:00"), ("B", "11:30:00")])
        .build();
    let old = network.data.clone();
    let (source, target) = (network.stop("A"), network.stop("B"));

    {
        let mut writer = network.database.write();
        let trip = writer.add_or_update_trip("express", BTreeMap::new());
        writer.add_or_update_connection(ConnectionRecord {
            global_id: "express:0".to_string(),
            dep_stop: source,
            arr_stop: target,
            departure_time: at("10:15:00"),
            arrival_time: at("10:45:00"),
            departure_delay: None,
            arrival_delay: None,
            trip,
            mode: ConnectionMode::NORMAL,
        })?;
        writer.close();
    }
    network.refresh();

    assert_eq!(old.connections.len(), 1);
    assert_eq!(network.data.connections.len(), 2);

    let scan_window = window("09:00:00", "12:00:00");
    let before = earliest_arrival::scan::<BasicMetric, _, _, _>(
        &old,
        &source,
        Some(&target),
        &scan_window,
        &SameStopTransfers::default(),
        &BasicComparator,
        &NoFilter,
    );
    let after = earliest_arrival::scan::<BasicMetric, _, _, _>(
        &network.data,
        &source,
        Some(&target),
        &scan_window,
        &SameStopTransfers::default(),
        &BasicComparator,
        &NoFilter,
    );

    assert_eq!(before.arrival_time_at(&target), Some(at("11:30:00")));
    assert_eq!(after.arrival_time_at(&target), Some(at("10:45:00")));
    Ok(())
}

#[test]
fn identifiers_survive_republication() {
    utils::init_logger();
    let mut network = NetworkBuilder::new()
        .trip("slow", &[("A", "10:00:00"), ("B", "11:30:00")])
        .build();
    let stop_before = network.stop("A");
    let trip_before = network.trip("slow");
    let connection_before = network.connection("slow:0");

    {
        let mut writer = network.database.write();
        writer.add_or_update_stop("Z", Coord::new(2.40, 48.90), BTreeMap::new());
        writer.close();
    }
    network.refresh();

    assert_eq!(network.stop("A"), stop_before);
    assert_eq!(network.trip("slow"), trip_before);
    assert_eq!(network.connection("slow:0"), connection_before);
    assert!(network.data.stops.by_global_id("Z").is_some());

    // identifiers are tagged with their database and never resolve elsewhere
    let mut foreign = connection_before;
    foreign.database_id = 9;
    assert!(network.data.connections.get(&foreign).is_none());
    let mut foreign = stop_before;
    foreign.database_id = 9;
    assert!(!network.data.stops.contains(&foreign));
}

#[test]
fn stops_merge_by_global_id_without_moving() -> Result<(), Error> {
    utils::init_logger();
    let mut network = NetworkBuilder::new()
        .stop("A", 2.3522, 48.8566)
        .trip("line", &[("A", "10:00:00"), ("B", "10:30:00")])
        .build();
    let stop = network.stop("A");

    {
        let mut writer = network.database.write();
        let mut attributes = BTreeMap::new();
        attributes.insert("name".to_string(), "Gare centrale".to_string());
        let merged = writer.add_or_update_stop("A", Coord::new(4.0, 45.0), attributes);
        assert_eq!(merged, stop);
        writer.close();
    }
    network.refresh();

    // the second coordinate is ignored, the attributes are merged in
    assert_eq!(network.data.stops.coord(&stop), Some(Coord::new(2.3522, 48.8566)));
    let merged = network
        .data
        .stops
        .get(&stop)
        .ok_or_else(|| format_err!("A is not in the snapshot"))?;
    assert_eq!(merged.attributes.get("name").map(String::as_str), Some("Gare centrale"));
    Ok(())
}

#[test]
fn late_insertions_surface_in_departure_order() -> Result<(), Error> {
    utils::init_logger();
    let mut network = NetworkBuilder::new()
        .trip("slow", &[("A", "10:00:00"), ("B", "11:30:00")])
        .build();
    let (source, target) = (network.stop("A"), network.stop("B"));

    // appended after "slow" but departing before it : sealing the
    // snapshot must put it back in departure order for the scans
    {
        let mut writer = network.database.write();
        let trip = writer.add_or_update_trip("owl", BTreeMap::new());
        writer.add_or_update_connection(ConnectionRecord {
            global_id: "owl:0".to_string(),
            dep_stop: source,
            arr_stop: target,
            departure_time: at("09:30:00"),
            arrival_time: at("09:50:00"),
            departure_delay: None,
            arrival_delay: None,
            trip,
            mode: ConnectionMode::NORMAL,
        })?;
        writer.close();
    }
    network.refresh();

    let scan = earliest_arrival::scan::<BasicMetric, _, _, _>(
        &network.data,
        &source,
        Some(&target),
        &window("09:00:00", "12:00:00"),
        &SameStopTransfers::default(),
        &BasicComparator,
        &NoFilter,
    );
    assert_eq!(scan.arrival_time_at(&target), Some(at("09:50:00")));
    Ok(())
}
