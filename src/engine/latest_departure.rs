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

//! Latest departure scan, the time-reversed dual of the earliest
//! arrival scan.
//!
//! Connections are walked in non-increasing departure-time order from
//! the window end, and journeys are built backward from the target :
//! the head of a journey stored at a stop is the moment one must leave
//! that stop to still reach the target within the window. Best here
//! means latest departure, ties broken by metric dominance.

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

/// The completed state of one latest departure scan.
pub struct LatestDepartureScan<M> {
    tree: JourneysTree<M>,
    best_by_stop: HashMap<StopId, Link>,
    target: StopId,
    window: TimeWindow,
}

impl<M: Metric> LatestDepartureScan<M> {
    pub fn target(&self) -> &StopId {
        &self.target
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn tree(&self) -> &JourneysTree<M> {
        &self.tree
    }

    /// The backward-built journey leaving `stop` as late as possible.
    /// Its head sits at `stop`, its genesis at the target.
    pub fn journey_from(&self, stop: &StopId) -> Option<Link> {
        self.best_by_stop.get(stop).copied()
    }

    pub fn departure_time_at(&self, stop: &StopId) -> Option<SecondsSinceEpoch> {
        self.journey_from(stop).map(|link| self.tree.time_of(&link))
    }

    pub fn nb_of_reached_stops(&self) -> usize {
        self.best_by_stop.len()
    }

    pub fn reached_stops(&self) -> impl Iterator<Item = (&StopId, &Link)> {
        self.best_by_stop.iter()
    }
}

/// Runs a latest departure scan toward `target` over `window`.
///
/// With a `source`, the scan stops as soon as earlier connections can
/// provably not improve the departure from it. With `source = None`
/// the whole window is scanned.
pub fn scan<M, C, Transfers, Filter>(
    data: &TransitData,
    target: &StopId,
    source: Option<&StopId>,
    window: &TimeWindow,
    transfers: &Transfers,
    comparator: &C,
    filter: &Filter,
) -> LatestDepartureScan<M>
where
    M: Metric,
    C: DominanceComparator<M>,
    Transfers: TransferGenerator,
    Filter: ConnectionFilter,
{
    filter.check_window(window.start(), window.end());

    let mut tree = JourneysTree::<M>::new();
    let mut best_by_stop = HashMap::new();
    // journey currently seated in each trip, head at the last departure
    let mut trip_links: HashMap<TripId, Link> = HashMap::new();

    let genesis = tree.depart(*target, window.end());
    best_by_stop.insert(*target, genesis);
    for (neighbor, duration) in transfers.reachable_from(data, target) {
        let walked = tree.walk_backward(&genesis, neighbor, duration);
        if tree.time_of(&walked) >= window.start() {
            record(&tree, &mut best_by_stop, comparator, walked);
        }
    }

    let mut nb_of_scanned = 0_usize;
    let mut enumerator = data.connections.enumerator();
    enumerator.move_to_latest(&window.end());
    while let Some((connection_id, connection)) = enumerator.prev() {
        if connection.departure_time < window.start() {
            break;
        }
        if let Some(source) = source {
            if let Some(best) = best_by_stop.get(source) {
                if tree.time_of(best) > connection.departure_time {
                    // every remaining connection departs before the
                    // best departure : the source cannot improve
                    break;
                }
            }
        }
        nb_of_scanned += 1;
        if connection.mode.is_cancelled() || !filter.can_be_taken(&connection_id, connection) {
            continue;
        }

        let seated = trip_links.get(&connection.trip).copied().filter(|link| {
            tree.stop_of(link) == connection.arr_stop
                && tree.time_of(link) >= connection.arrival_time()
        });
        let onboard = match seated {
            Some(previous) => tree.ride_backward(&previous, connection_id, connection),
            None => {
                // using a journey stored at the arrival stop means
                // alighting there
                if !connection.mode.can_get_off() {
                    continue;
                }
                let continuation = best_by_stop
                    .get(&connection.arr_stop)
                    .filter(|link| tree.time_of(link) >= connection.arrival_time());
                match continuation {
                    Some(link) => {
                        let link = *link;
                        tree.ride_backward(&link, connection_id, connection)
                    }
                    None => continue,
                }
            }
        };
        trip_links.insert(connection.trip, onboard);

        if !connection.mode.can_get_on() {
            continue;
        }
        if record(&tree, &mut best_by_stop, comparator, onboard) {
            for (neighbor, duration) in transfers.reachable_from(data, &connection.dep_stop) {
                let walked = tree.walk_backward(&onboard, neighbor, duration);
                if tree.time_of(&walked) >= window.start() {
                    record(&tree, &mut best_by_stop, comparator, walked);
                }
            }
        }
    }

    debug!(
        "latest departure toward {} over {} : {} connections scanned, {} stops reached",
        target,
        window,
        nb_of_scanned,
        best_by_stop.len()
    );

    LatestDepartureScan {
        tree,
        best_by_stop,
        target: *target,
        window: *window,
    }
}

/// Keeps `candidate` when it beats the incumbent of its stop.
/// Later departure wins ; on equal departure, metric dominance wins.
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
            let improves = candidate_time > incumbent_time
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
