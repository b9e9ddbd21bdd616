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

mod utils;

use anyhow::{format_err, Error};
use rstest::{fixture, rstest};
use sleipnir::{
    earliest_arrival, latest_departure, BasicComparator, BasicMetric, ConnectionFilter,
    IsochroneDirection, IsochroneFilter, NoFilter, SameStopTransfers,
};
use utils::{at, window, Network, NetworkBuilder};

/// The two connected lines of the other tests, plus a line between two
/// stops nothing else serves. X and Y stay out of every isochrone
/// anchored on the connected side.
#[fixture]
fn islanded_network() -> Network {
    NetworkBuilder::new()
        .trip("blue", &[("A", "10:00:00"), ("B", "10:30:00"), ("C", "11:00:00")])
        .trip("green", &[("B", "10:45:00"), ("D", "11:30:00")])
        .trip("island", &[("X", "10:00:00"), ("Y", "10:30:00")])
        .build()
}

#[rstest]
fn an_earliest_arrival_scan_freezes_into_an_isochrone(islanded_network: Network) {
    utils::init_logger();
    let source = islanded_network.stop("A");

    let scan = earliest_arrival::scan::<BasicMetric, _, _, _>(
        &islanded_network.data,
        &source,
        None,
        &window("09:00:00", "12:00:00"),
        &SameStopTransfers::default(),
        &BasicComparator,
        &NoFilter,
    );
    let isochrone = IsochroneFilter::from_earliest_arrival(&scan);

    assert_eq!(isochrone.direction(), IsochroneDirection::FromSource);
    assert_eq!(isochrone.anchor(), &source);
    assert_eq!(isochrone.nb_of_reached_stops(), scan.nb_of_reached_stops());

    let c = islanded_network.stop("C");
    assert_eq!(isochrone.reach_time(&c), scan.arrival_time_at(&c));
    assert!(isochrone.is_reachable(&c, &at("11:00:00")));
    assert!(!isochrone.is_reachable(&c, &at("10:59:59")));

    let x = islanded_network.stop("X");
    assert_eq!(isochrone.reach_time(&x), None);
    assert!(!isochrone.is_reachable(&x, &at("11:59:59")));
}

#[rstest]
fn a_latest_departure_scan_freezes_into_an_isochrone(islanded_network: Network) {
    utils::init_logger();
    let target = islanded_network.stop("D");

    let scan = latest_departure::scan::<BasicMetric, _, _, _>(
        &islanded_network.data,
        &target,
        None,
        &window("09:00:00", "12:00:00"),
        &SameStopTransfers::default(),
        &BasicComparator,
        &NoFilter,
    );
    let isochrone = IsochroneFilter::from_latest_departure(&scan);

    assert_eq!(isochrone.direction(), IsochroneDirection::TowardTarget);
    assert_eq!(isochrone.anchor(), &target);
    // D itself, then B through the green line, then A through the blue one
    assert_eq!(isochrone.nb_of_reached_stops(), 3);

    let a = islanded_network.stop("A");
    assert_eq!(isochrone.reach_time(&a), Some(at("10:00:00")));
    assert!(isochrone.is_reachable(&a, &at("10:00:00")));
    assert!(!isochrone.is_reachable(&a, &at("10:00:01")));
}

#[rstest]
fn the_isochrone_gates_individual_connections(islanded_network: Network) -> Result<(), Error> {
    utils::init_logger();
    let source = islanded_network.stop("A");

    let scan = earliest_arrival::scan::<BasicMetric, _, _, _>(
        &islanded_network.data,
        &source,
        None,
        &window("09:00:00", "12:00:00"),
        &SameStopTransfers::default(),
        &BasicComparator,
        &NoFilter,
    );
    let isochrone = IsochroneFilter::from_earliest_arrival(&scan);

    // green leaves B at 10:45, after the 10:30 reach of B
    let boardable = islanded_network.connection("green:0");
    let connection = islanded_network
        .data
        .connections
        .get(&boardable)
        .ok_or_else(|| format_err!("green:0 is not in the snapshot"))?;
    assert!(isochrone.can_be_taken(&boardable, connection));

    // nothing connects A to the island
    let unboardable = islanded_network.connection("island:0");
    let connection = islanded_network
        .data
        .connections
        .get(&unboardable)
        .ok_or_else(|| format_err!("island:0 is not in the snapshot"))?;
    assert!(!isochrone.can_be_taken(&unboardable, connection));
    Ok(())
}

#[rstest]
fn pruning_against_the_target_isochrone_keeps_the_answer(islanded_network: Network) {
    utils::init_logger();
    let (source, target) = (islanded_network.stop("A"), islanded_network.stop("D"));
    let scan_window = window("09:00:00", "12:00:00");

    let backward = latest_departure::scan::<BasicMetric, _, _, _>(
        &islanded_network.data,
        &target,
        None,
        &scan_window,
        &SameStopTransfers::default(),
        &BasicComparator,
        &NoFilter,
    );
    let isochrone = IsochroneFilter::from_latest_departure(&backward);

    let pruned = earliest_arrival::scan::<BasicMetric, _, _, _>(
        &islanded_network.data,
        &source,
        Some(&target),
        &scan_window,
        &SameStopTransfers::default(),
        &BasicComparator,
        &isochrone,
    );
    let unpruned = earliest_arrival::scan::<BasicMetric, _, _, _>(
        &islanded_network.data,
        &source,
        Some(&target),
        &scan_window,
        &SameStopTransfers::default(),
        &BasicComparator,
        &NoFilter,
    );

    assert_eq!(
        pruned.arrival_time_at(&target),
        unpruned.arrival_time_at(&target)
    );
    // C cannot reach D, so the pruned scan never visits it
    assert_eq!(pruned.arrival_time_at(&islanded_network.stop("C")), None);
    assert!(pruned.nb_of_reached_stops() < unpruned.nb_of_reached_stops());
}

#[rstest]
#[should_panic(expected = "queried at")]
fn queries_outside_the_window_are_refused(islanded_network: Network) {
    utils::init_logger();
    let source = islanded_network.stop("A");

    let scan = earliest_arrival::scan::<BasicMetric, _, _, _>(
        &islanded_network.data,
        &source,
        None,
        &window("09:00:00", "12:00:00"),
        &SameStopTransfers::default(),
        &BasicComparator,
        &NoFilter,
    );
    let isochrone = IsochroneFilter::from_earliest_arrival(&scan);

    isochrone.is_reachable(&source, &at("08:00:00"));
}

#[rstest]
#[should_panic(expected = "used over")]
fn scans_wider_than_the_window_are_refused(islanded_network: Network) {
    utils::init_logger();
    let source = islanded_network.stop("A");

    let scan = earliest_arrival::scan::<BasicMetric, _, _, _>(
        &islanded_network.data,
        &source,
        None,
        &window("09:00:00", "12:00:00"),
        &SameStopTransfers::default(),
        &BasicComparator,
        &NoFilter,
    );
    let isochrone = IsochroneFilter::from_earliest_arrival(&scan);

    isochrone.check_window(at("08:00:00"), at("13:00:00"));
}
