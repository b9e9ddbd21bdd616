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

//! Profiled scan : every Pareto-optimal journey of the window.
//!
//! Connections are processed in non-increasing departure-time order,
//! and journeys are grown backward from the target. When a connection
//! is processed, every journey departing later is already final, so
//! the frontier at its arrival stop can be extended through it. Each
//! stop carries a frontier of (journey, criteria) pairs where the
//! criteria pair a departure time with the accumulated metric : leaving
//! later dominates, and the metric dominates, neither outweighing the
//! other.
//!
//! A frontier per trip keeps journeys boardable by earlier connections
//! of the same vehicle, so staying seated through a stop needs no
//! interchange time and survives get-on-only restrictions.

use crate::{
    criteria::{BasicMetric, Dominance, DominanceComparator, Metric},
    engine::{
        journeys_tree::{JourneysTree, Link},
        pareto_front::ParetoFront,
    },
    filters::ConnectionFilter,
    identifiers::{StopId, TripId},
    time::{PositiveDuration, SecondsSinceEpoch, TimeWindow},
    transfers::TransferGenerator,
    transit_data::TransitData,
};
use std::collections::HashMap;
use tracing::debug;

/// What a profiled frontier orders its journeys by : when the journey
/// leaves the stop it is stored at, and what it costs.
#[derive(Debug, Clone)]
pub struct ProfiledCriteria<M> {
    pub departure: SecondsSinceEpoch,
    pub metric: M,
}

/// Later departure dominates, combined with the metric's own order.
pub struct ProfiledComparator<'c, C> {
    metric_comparator: &'c C,
}

impl<'c, C> ProfiledComparator<'c, C> {
    pub fn new(metric_comparator: &'c C) -> Self {
        Self { metric_comparator }
    }
}

impl<M, C> DominanceComparator<ProfiledCriteria<M>> for ProfiledComparator<'_, C>
where
    M: Metric,
    C: DominanceComparator<M>,
{
    fn dominance(&self, lhs: &ProfiledCriteria<M>, rhs: &ProfiledCriteria<M>) -> Dominance {
        let departure = Dominance::from_ord(lhs.departure.cmp(&rhs.departure).reverse());
        let metric = self.metric_comparator.dominance(&lhs.metric, &rhs.metric);
        departure.combine(metric)
    }
}

/// Optional pruning oracle of the profiled scan.
///
/// Before a candidate enters any frontier, the guesser may declare
/// that no completed journey grown from it can enter `completed` (the
/// frontier at the scan's source). Declaring so prunes the candidate ;
/// declining never hurts correctness, so `false` is always a sound
/// answer.
pub trait MetricGuesser<M: Metric> {
    fn surely_dominated<C>(
        &mut self,
        completed: &ParetoFront<Link, ProfiledCriteria<M>>,
        criteria: &ProfiledCriteria<M>,
        comparator: &C,
    ) -> bool
    where
        C: DominanceComparator<ProfiledCriteria<M>>;

    /// The scan reports every move of its clock, i.e. the departure
    /// time of the connection about to be processed.
    fn clock_advanced(&mut self, now: SecondsSinceEpoch);
}

/// Never prunes anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGuesser;

impl<M: Metric> MetricGuesser<M> for NoGuesser {
    fn surely_dominated<C>(
        &mut self,
        _completed: &ParetoFront<Link, ProfiledCriteria<M>>,
        _criteria: &ProfiledCriteria<M>,
        _comparator: &C,
    ) -> bool
    where
        C: DominanceComparator<ProfiledCriteria<M>>,
    {
        false
    }

    fn clock_advanced(&mut self, _now: SecondsSinceEpoch) {}
}

/// Guesses that the candidate teleports to the source : completing a
/// journey can only depart the source earlier and accumulate more
/// metric, so the candidate's own criteria are an optimistic bound.
/// Dominance answers are memoized until the scan clock moves, which is
/// sound because a frontier's coverage only ever grows.
#[derive(Debug, Default)]
pub struct TeleportGuesser {
    tick: Option<SecondsSinceEpoch>,
    memo: HashMap<(u64, u32, u64), bool>,
    nb_of_memo_hits: usize,
}

impl TeleportGuesser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_of_memo_hits(&self) -> usize {
        self.nb_of_memo_hits
    }
}

impl MetricGuesser<BasicMetric> for TeleportGuesser {
    fn surely_dominated<C>(
        &mut self,
        completed: &ParetoFront<Link, ProfiledCriteria<BasicMetric>>,
        criteria: &ProfiledCriteria<BasicMetric>,
        comparator: &C,
    ) -> bool
    where
        C: DominanceComparator<ProfiledCriteria<BasicMetric>>,
    {
        let key = (
            criteria.departure.total_seconds(),
            criteria.metric.nb_of_vehicles,
            criteria.metric.total_duration.total_seconds(),
        );
        if let Some(answer) = self.memo.get(&key) {
            self.nb_of_memo_hits += 1;
            return *answer;
        }
        let answer = completed.dominates(criteria, comparator);
        self.memo.insert(key, answer);
        answer
    }

    fn clock_advanced(&mut self, now: SecondsSinceEpoch) {
        if self.tick != Some(now) {
            self.tick = Some(now);
            self.memo.clear();
        }
    }
}

/// The completed state of one profiled scan.
pub struct ProfiledScan<M> {
    tree: JourneysTree<M>,
    source_profile: ParetoFront<Link, ProfiledCriteria<M>>,
    source: StopId,
    target: StopId,
    window: TimeWindow,
}

impl<M: Metric> ProfiledScan<M> {
    pub fn source(&self) -> &StopId {
        &self.source
    }

    pub fn target(&self) -> &StopId {
        &self.target
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn tree(&self) -> &JourneysTree<M> {
        &self.tree
    }

    /// Every Pareto-optimal journey leaving the source, as
    /// (journey, criteria) pairs. Journeys are backward-built : the
    /// head sits at the source, the genesis at the target.
    pub fn profile(&self) -> &ParetoFront<Link, ProfiledCriteria<M>> {
        &self.source_profile
    }

    pub fn nb_of_options(&self) -> usize {
        self.source_profile.len()
    }

    /// When this journey reaches the target.
    pub fn arrival_of(&self, journey: &Link) -> SecondsSinceEpoch {
        let root = self.tree.root_of(journey);
        self.tree.time_of(&root)
    }

    /// The journey of the profile arriving first at the target.
    pub fn earliest_arrival_option(&self) -> Option<(Link, SecondsSinceEpoch)> {
        self.source_profile
            .iter()
            .map(|(link, _)| (*link, self.arrival_of(link)))
            .min_by_key(|(_, arrival)| *arrival)
    }
}

/// Runs a profiled scan from `source` to `target` over `window`.
pub fn scan<M, C, Transfers, Filter, Guesser>(
    data: &TransitData,
    source: &StopId,
    target: &StopId,
    window: &TimeWindow,
    transfers: &Transfers,
    comparator: &C,
    filter: &Filter,
    guesser: &mut Guesser,
) -> ProfiledScan<M>
where
    M: Metric,
    C: DominanceComparator<M>,
    Transfers: TransferGenerator,
    Filter: ConnectionFilter,
    Guesser: MetricGuesser<M>,
{
    filter.check_window(window.start(), window.end());

    let profiled = ProfiledComparator::new(comparator);
    let mut tree = JourneysTree::<M>::new();
    let mut stop_fronts: HashMap<StopId, ParetoFront<Link, ProfiledCriteria<M>>> = HashMap::new();
    let mut trip_fronts: HashMap<TripId, ParetoFront<Link, ProfiledCriteria<M>>> = HashMap::new();
    // walking is allowed as the final leg into the target
    let walks_to_target: HashMap<StopId, PositiveDuration> =
        transfers.reachable_from(data, target).into_iter().collect();

    let mut nb_of_scanned = 0_usize;
    let mut nb_of_pruned = 0_usize;
    let mut enumerator = data.connections.enumerator();
    enumerator.move_to_latest(&window.end());
    while let Some((connection_id, connection)) = enumerator.prev() {
        if connection.departure_time < window.start() {
            break;
        }
        nb_of_scanned += 1;
        guesser.clock_advanced(connection.departure_time);
        if connection.mode.is_cancelled() || !filter.can_be_taken(&connection_id, connection) {
            continue;
        }

        let mut candidates: Vec<Link> = Vec::new();

        if connection.mode.can_get_off() {
            // trivial : the connection lands on the target, or within
            // walking distance of it
            if connection.arr_stop == *target {
                let genesis = tree.depart(*target, connection.arrival_time());
                candidates.push(tree.ride_backward(&genesis, connection_id, connection));
            } else if let Some(walk) = walks_to_target.get(&connection.arr_stop) {
                let reach_target = connection.arrival_time() + *walk;
                if reach_target <= window.end() {
                    let genesis = tree.depart(*target, reach_target);
                    let walked = tree.walk_backward(&genesis, connection.arr_stop, *walk);
                    candidates.push(tree.ride_backward(&walked, connection_id, connection));
                }
            }

            // extensions : alight, wait out the interchange, continue
            // with a journey already final at the arrival stop
            if let Some(front) = stop_fronts.get(&connection.arr_stop) {
                if let Some(interchange) =
                    transfers.time_between(data, &connection.arr_stop, &connection.arr_stop)
                {
                    let earliest_continuation = connection.arrival_time() + interchange;
                    for (link, criteria) in front.iter() {
                        if criteria.departure >= earliest_continuation {
                            candidates.push(tree.ride_backward(link, connection_id, connection));
                        }
                    }
                }
            }
        }

        // staying seated : no interchange, no alighting restriction
        if let Some(front) = trip_fronts.get(&connection.trip) {
            for (link, criteria) in front.iter() {
                if tree.stop_of(link) == connection.arr_stop
                    && criteria.departure >= connection.arrival_time()
                {
                    candidates.push(tree.ride_backward(link, connection_id, connection));
                }
            }
        }

        if candidates.is_empty() {
            continue;
        }

        let mut kept: Vec<(Link, ProfiledCriteria<M>)> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let criteria = ProfiledCriteria {
                departure: connection.departure_time,
                metric: tree.metric_of(&candidate).clone(),
            };
            if let Some(source_front) = stop_fronts.get(source) {
                if guesser.surely_dominated(source_front, &criteria, &profiled) {
                    nb_of_pruned += 1;
                    continue;
                }
            }
            kept.push((candidate, criteria));
        }

        for (candidate, criteria) in kept {
            let trip_front = trip_fronts.entry(connection.trip).or_default();
            trip_front.add(candidate, criteria.clone(), &profiled);
            if connection.mode.can_get_on() {
                let stop_front = stop_fronts.entry(connection.dep_stop).or_default();
                stop_front.add_or_merge(candidate, criteria, &profiled, |head, twin| {
                    tree.join(head, twin)
                });
            }
        }
    }

    // journeys that start by walking away from the source
    let mut source_profile = stop_fronts.remove(source).unwrap_or_default();
    for (neighbor, duration) in transfers.reachable_from(data, source) {
        if let Some(front) = stop_fronts.get(&neighbor) {
            for (link, criteria) in front.iter() {
                let earliest_departure = window.start() + duration;
                if criteria.departure < earliest_departure {
                    continue;
                }
                let walked = tree.walk_backward(link, *source, duration);
                let walked_criteria = ProfiledCriteria {
                    departure: tree.time_of(&walked),
                    metric: tree.metric_of(&walked).clone(),
                };
                source_profile.add(walked, walked_criteria, &profiled);
            }
        }
    }

    debug!(
        "profiled scan {} -> {} over {} : {} connections scanned, {} candidates pruned, {} options",
        source,
        target,
        window,
        nb_of_scanned,
        nb_of_pruned,
        source_profile.len()
    );

    ProfiledScan {
        tree,
        source_profile,
        source: *source,
        target: *target,
        window: *window,
    }
}
