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
// www.navitia.io

//! Earliest arrival scan.
//!
//! One forward pass over the connections of the departure window, in
//! departure-time order. Each stop keeps the single best journey known
//! so far, best meaning earliest arrival, ties broken by metric
//! dominance. Boarding is allowed when the journey at the departure
//! stop arrives no later than the connection departs, or when the
//! journey is already seated in the connection's trip.

use crate::{
    criteria::{Dominance, DominanceComparator, Metric},
    engine::journeys_tree::{JourneysTree, Link},
    filters::ConnectionFilter,
    identifiers::{StopId, TripId},
    time::{SecondsSinceEpoch, TimeWindow},
    transfers::TransferGenerator,
    transit_data::TransitData,
};
use std::collections::{hash_map::Entry, HashMap};
use tracing::debug;

/// The completed state of one earliest arrival scan.
pub struct EarliestArrivalScan<M> {
    tree: JourneysTree<M>,
    best_by_stop: HashMap<StopId, Link>,
    source: StopId,
    window: TimeWindow,
}

impl<M: Metric> EarliestArrivalScan<M> {
    pub fn source(&self) -> &StopId {
        &self.source
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn tree(&self) -> &JourneysTree<M> {
        &self.tree
    }

    /// The best journey reaching `stop`, or `None` when the stop is
    /// not reachable within the window.
    pub fn journey_to(&self, stop: &StopId) -> Option<Link> {
        self.best_by_stop.get(stop).copied()
    }

    pub fn arrival_time_at(&self, stop: &StopId) -> Option<SecondsSinceEpoch> {
        self.journey_to(stop).map(|link| self.tree.time_of(&link))
    }

    pub fn nb_of_reached_stops(&self) -> usize {
        self.best_by_stop.len()
    }

    /// Every reached stop with its best journey.
    pub fn reached_stops(&self) -> impl Iterator<Item = (&StopId, &Link)> {
        self.best_by_stop.iter()
    }
}

/// Runs an earliest arrival scan from `source` over `window`.
///
/// With a `target`, the scan stops as soon as later connections can
/// provably not improve it. With `target = None` the whole window is
/// scanned, which is how an isochrone is computed.
pub fn scan<M, C, Transfers, Filter>(
    data: &TransitData,
    source: &StopId,
    target: Option<&StopId>,
    window: &TimeWindow,
    transfers: &Transfers,
    comparator: &C,
    filter: &Filter,
) -> EarliestArrivalScan<M>
where
    M: Metric,
    C: DominanceComparator<M>,
    Transfers: TransferGenerator,
    Filter: ConnectionFilter,
{
    filter.check_window(window.start(), window.end());

    let mut tree = JourneysTree::<M>::new();
    let mut best_by_stop = HashMap::new();
    // journey currently seated in each trip, head at the last arrival
    let mut trip_links: HashMap<TripId, Link> = HashMap::new();

    let genesis = tree.depart(*source, window.start());
    best_by_stop.insert(*source, genesis);
    for (neighbor, duration) in transfers.reachable_from(data, source) {
        let walked = tree.walk_forward(&genesis, neighbor, duration);
        if tree.time_of(&walked) <= window.end() {
            record(&tree, &mut best_by_stop, comparator, walked);
        }
    }

    let mut nb_of_scanned = 0_usize;
    let mut enumerator = data.connections.enumerator();
    enumerator.move_to(&window.start());
    while let Some((connection_id, connection)) = enumerator.next() {
        if connection.departure_time > window.end() {
            break;
        }
        if let Some(target) = target {
            if let Some(best) = best_by_stop.get(target) {
                if tree.time_of(best) < connection.departure_time {
                    // every remaining connection departs after the
                    // best arrival : the target cannot improve
                    break;
                }
            }
        }
        nb_of_scanned += 1;
        if connection.mode.is_cancelled() || !filter.can_be_taken(&connection_id, connection) {
            continue;
        }

        let seated = trip_links.get(&connection.trip).copied().filter(|link| {
            tree.stop_of(link) == connection.dep_stop
                && tree.time_of(link) <= connection.departure_time
        });
        let onboard = match seated {
            Some(previous) => tree.ride_forward(&previous, connection_id, connection),
            None => {
                if !connection.mode.can_get_on() {
                    continue;
                }
                let boardable = best_by_stop
                    .get(&connection.dep_stop)
                    .filter(|link| tree.time_of(link) <= connection.departure_time);
                match boardable {
                    Some(link) => {
                        let link = *link;
                        tree.ride_forward(&link, connection_id, connection)
                    }
                    None => continue,
                }
            }
        };
        trip_links.insert(connection.trip, onboard);

        if !connection.mode.can_get_off() {
            continue;
        }
        if record(&tree, &mut best_by_stop, comparator, onboard) {
            for (neighbor, duration) in transfers.reachable_from(data, &connection.arr_stop) {
                let walked = tree.walk_forward(&onboard, neighbor, duration);
                if tree.time_of(&walked) <= window.end() {
                    record(&tree, &mut best_by_stop, comparator, walked);
                }
            }
        }
    }

    debug!(
        "earliest arrival from {} over {} : {} connections scanned, {} stops reached",
        source,
        window,
        nb_of_scanned,
        best_by_stop.len()
    );

    EarliestArrivalScan {
        tree,
        best_by_stop,
        source: *source,
        window: *window,
    }
}

/// Keeps `candidate` when it beats the incumbent of its stop.
/// Earlier arrival wins ; on equal arrival, metric dominance wins.
fn record<M, C>(
    tree: &JourneysTree<M>,
    best_by_stop: &mut HashMap<StopId, Link>,
    comparator: &C,
    candidate: Link,
) -> bool
where
    M: Metric,
    C: DominanceComparator<M>,
{
    match best_by_stop.entry(tree.stop_of(&candidate)) {
        Entry::Vacant(entry) => {
            entry.insert(candidate);
            true
        }
        Entry::Occupied(mut entry) => {
            let candidate_time = tree.time_of(&candidate);
            let incumbent_time = tree.time_of(entry.get());
            let improves = candidate_time < incumbent_time
                || (candidate_time == incumbent_time
                    && comparator.dominance(tree.metric_of(&candidate), tree.metric_of(entry.get()))
                        == Dominance::Less);
            if improves {
                entry.insert(candidate);
            }
            improves
        }
    }
}
