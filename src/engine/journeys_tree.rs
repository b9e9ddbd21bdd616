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

//! Journeys under construction, stored as a tree.
//!
//! During a scan, many partial journeys share their first legs. Instead
//! of cloning leg sequences around, every partial journey is a `Link`
//! (a plain index) into one arena, and extending a journey pushes one
//! node whose parent is the previous end. A complete journey is read by
//! walking `previous` pointers from its head back to the genesis.
//!
//! Two equivalent journeys (same place, same time, equal metric) can be
//! merged with [`JourneysTree::join`] : the merged head is kept as an
//! `alternative` sibling, so every way of achieving the same optimum
//! stays enumerable.

use crate::{
    criteria::{ChainStep, Metric, PreviousLeg},
    identifiers::{ConnectionId, StopId, TripId},
    time::{PositiveDuration, SecondsSinceEpoch},
    transit_data::Connection,
};

type Id = usize;

const MAX_ID: Id = usize::MAX;

/// A partial journey : a handle into a [`JourneysTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    id: Id,
}

/// How the last leg of a partial journey was traveled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// the journey has not moved yet
    Genesis,
    Vehicle {
        connection: ConnectionId,
        trip: TripId,
    },
    Walk {
        duration: PositiveDuration,
    },
}

#[derive(Debug, Clone)]
struct LinkData<M> {
    stop: StopId,
    time: SecondsSinceEpoch,
    kind: LinkKind,
    previous: Option<Link>,
    alternative: Option<Link>,
    metric: M,
}

pub struct JourneysTree<M> {
    links: Vec<LinkData<M>>,
}

impl<M: Metric> JourneysTree<M> {
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    pub fn nb_of_links(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Forget every journey, keeping the allocation for the next scan.
    pub fn clear(&mut self) {
        self.links.clear();
    }

    /// A journey that starts at `stop` at `time` and has not moved yet.
    pub fn depart(&mut self, stop: StopId, time: SecondsSinceEpoch) -> Link {
        self.push(LinkData {
            stop,
            time,
            kind: LinkKind::Genesis,
            previous: None,
            alternative: None,
            metric: M::zero(),
        })
    }

    /// Extend a journey by riding `connection` to its arrival stop.
    pub fn ride_forward(
        &mut self,
        previous: &Link,
        connection_id: ConnectionId,
        connection: &Connection,
    ) -> Link {
        self.extend(
            previous,
            connection.arr_stop,
            connection.arrival_time(),
            LinkKind::Vehicle {
                connection: connection_id,
                trip: connection.trip,
            },
        )
    }

    /// Extend a backward-built journey by riding `connection` from its
    /// departure stop. The new head is *earlier* than the previous one.
    pub fn ride_backward(
        &mut self,
        previous: &Link,
        connection_id: ConnectionId,
        connection: &Connection,
    ) -> Link {
        self.extend(
            previous,
            connection.dep_stop,
            connection.departure_time,
            LinkKind::Vehicle {
                connection: connection_id,
                trip: connection.trip,
            },
        )
    }

    /// Extend a journey by walking to `stop`, toward later times.
    pub fn walk_forward(
        &mut self,
        previous: &Link,
        stop: StopId,
        duration: PositiveDuration,
    ) -> Link {
        let time = self.links[previous.id].time + duration;
        self.extend(previous, stop, time, LinkKind::Walk { duration })
    }

    /// Extend a backward-built journey by walking to `stop`, toward
    /// earlier times.
    pub fn walk_backward(
        &mut self,
        previous: &Link,
        stop: StopId,
        duration: PositiveDuration,
    ) -> Link {
        let previous_time = self.links[previous.id].time;
        debug_assert!(previous_time.total_seconds() >= duration.total_seconds());
        let time = previous_time
            .checked_sub(duration)
            .unwrap_or_else(SecondsSinceEpoch::zero);
        self.extend(previous, stop, time, LinkKind::Walk { duration })
    }

    /// Record `alternative` as another way of reaching `head`'s place
    /// and time. The caller must have checked that both journeys are
    /// equivalent.
    pub fn join(&mut self, head: &Link, alternative: Link) {
        debug_assert!(*head != alternative);
        debug_assert!(self.links[head.id].stop == self.links[alternative.id].stop);
        debug_assert!(self.links[head.id].time == self.links[alternative.id].time);
        let mut cursor = *head;
        while let Some(next) = self.links[cursor.id].alternative {
            debug_assert!(next != alternative);
            cursor = next;
        }
        self.links[cursor.id].alternative = Some(alternative);
    }

    /// The same journey traveled in the other direction : same places
    /// at the same times, legs in reverse order, metric recomputed.
    /// Reversing twice yields back the original sequence.
    pub fn reverse(&mut self, head: &Link) -> Link {
        let mut steps: Vec<(StopId, SecondsSinceEpoch, LinkKind)> = Vec::new();
        let mut cursor = Some(*head);
        while let Some(link) = cursor {
            let data = &self.links[link.id];
            steps.push((data.stop, data.time, data.kind));
            cursor = data.previous;
        }
        // steps run from head down to genesis. The reversed journey
        // starts where the original ended, and each leg keeps its kind
        // while now pointing at the *preceding* place and time.
        let (first_stop, first_time, _) = steps[0];
        let mut current = self.depart(first_stop, first_time);
        for index in 0..steps.len() - 1 {
            let kind = steps[index].2;
            debug_assert!(!matches!(kind, LinkKind::Genesis));
            let (stop, time, _) = steps[index + 1];
            current = self.extend(&current, stop, time, kind);
        }
        current
    }

    /// The genesis this journey grew from.
    pub fn root_of(&self, head: &Link) -> Link {
        let mut cursor = *head;
        while let Some(previous) = self.links[cursor.id].previous {
            cursor = previous;
        }
        cursor
    }

    /// Walk from `head` back to the genesis, head first.
    pub fn chain_of(&self, head: &Link) -> Chain<'_, M> {
        Chain {
            tree: self,
            cursor: Some(*head),
        }
    }

    pub fn stop_of(&self, link: &Link) -> StopId {
        self.links[link.id].stop
    }

    pub fn time_of(&self, link: &Link) -> SecondsSinceEpoch {
        self.links[link.id].time
    }

    pub fn kind_of(&self, link: &Link) -> LinkKind {
        self.links[link.id].kind
    }

    pub fn metric_of(&self, link: &Link) -> &M {
        &self.links[link.id].metric
    }

    pub fn previous(&self, link: &Link) -> Option<Link> {
        self.links[link.id].previous
    }

    pub fn alternative(&self, link: &Link) -> Option<Link> {
        self.links[link.id].alternative
    }

    fn extend(
        &mut self,
        previous: &Link,
        stop: StopId,
        time: SecondsSinceEpoch,
        kind: LinkKind,
    ) -> Link {
        let previous_data = &self.links[previous.id];
        let step = ChainStep {
            previous_time: previous_data.time,
            previous_leg: previous_leg_of(previous_data.kind),
            new_stop: stop,
            new_time: time,
            new_trip: match kind {
                LinkKind::Vehicle { trip, .. } => Some(trip),
                LinkKind::Genesis | LinkKind::Walk { .. } => None,
            },
        };
        let metric = previous_data.metric.chain(&step);
        self.push(LinkData {
            stop,
            time,
            kind,
            previous: Some(*previous),
            alternative: None,
            metric,
        })
    }

    fn push(&mut self, data: LinkData<M>) -> Link {
        debug_assert!(self.links.len() < MAX_ID);
        let id = self.links.len();
        self.links.push(data);
        Link { id }
    }
}

impl<M: Metric> Default for JourneysTree<M> {
    fn default() -> Self {
        Self::new()
    }
}

fn previous_leg_of(kind: LinkKind) -> PreviousLeg {
    match kind {
        LinkKind::Genesis => PreviousLeg::Genesis,
        LinkKind::Walk { .. } => PreviousLeg::Walk,
        LinkKind::Vehicle { trip, .. } => PreviousLeg::Vehicle(trip),
    }
}

pub struct Chain<'tree, M> {
    tree: &'tree JourneysTree<M>,
    cursor: Option<Link>,
}

impl<M> Iterator for Chain<'_, M> {
    type Item = Link;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.cursor?;
        self.cursor = self.tree.links[link.id].previous;
        Some(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::BasicMetric;
    use crate::transit_data::ConnectionMode;

    fn stop(local_id: u32) -> StopId {
        StopId::new(0, 0, local_id)
    }

    fn seconds(seconds: u64) -> SecondsSinceEpoch {
        SecondsSinceEpoch::from_unix_seconds(seconds)
    }

    fn connection(
        local_id: u32,
        from: StopId,
        to: StopId,
        departure: u64,
        travel_time: u16,
        trip: TripId,
    ) -> (ConnectionId, Connection) {
        let id = ConnectionId::new(0, 0, local_id);
        let connection = Connection {
            global_id: format!("c{}", local_id),
            dep_stop: from,
            arr_stop: to,
            departure_time: seconds(departure),
            travel_time,
            departure_delay: 0,
            arrival_delay: 0,
            trip,
            mode: ConnectionMode::NORMAL,
        };
        (id, connection)
    }

    #[test]
    fn a_journey_is_read_back_head_first() {
        let mut tree = JourneysTree::<BasicMetric>::new();
        let trip = TripId::new(0, 0, 7);
        let (first_id, first) = connection(0, stop(1), stop(2), 1_000, 300, trip);
        let (second_id, second) = connection(1, stop(2), stop(3), 1_400, 200, trip);

        let genesis = tree.depart(stop(1), seconds(900));
        let onboard = tree.ride_forward(&genesis, first_id, &first);
        let head = tree.ride_forward(&onboard, second_id, &second);

        let chain: Vec<(StopId, u64)> = tree
            .chain_of(&head)
            .map(|link| (tree.stop_of(&link), tree.time_of(&link).total_seconds()))
            .collect();
        assert_eq!(
            chain,
            vec![(stop(3), 1_600), (stop(2), 1_300), (stop(1), 900)]
        );
        assert_eq!(tree.root_of(&head), genesis);

        // two connections of the same trip count as one vehicle
        assert_eq!(tree.metric_of(&head).nb_of_vehicles, 1);
        assert_eq!(tree.metric_of(&head).total_duration.total_seconds(), 700);
    }

    #[test]
    fn walking_moves_time_in_the_scan_direction() {
        let mut tree = JourneysTree::<BasicMetric>::new();
        let genesis = tree.depart(stop(1), seconds(1_000));
        let forward = tree.walk_forward(&genesis, stop(2), PositiveDuration::from_seconds(120));
        assert_eq!(tree.time_of(&forward).total_seconds(), 1_120);

        let backward_genesis = tree.depart(stop(5), seconds(2_000));
        let backward = tree.walk_backward(
            &backward_genesis,
            stop(4),
            PositiveDuration::from_seconds(120),
        );
        assert_eq!(tree.time_of(&backward).total_seconds(), 1_880);
        assert_eq!(tree.metric_of(&backward).nb_of_vehicles, 0);
    }

    #[test]
    fn reversing_preserves_places_and_times() {
        let mut tree = JourneysTree::<BasicMetric>::new();
        let trip = TripId::new(0, 0, 7);
        let (connection_id, ride) = connection(0, stop(1), stop(2), 1_000, 300, trip);

        let genesis = tree.depart(stop(1), seconds(900));
        let onboard = tree.ride_forward(&genesis, connection_id, &ride);
        let head = tree.walk_forward(&onboard, stop(3), PositiveDuration::from_seconds(100));

        let forward: Vec<(StopId, u64)> = tree
            .chain_of(&head)
            .map(|link| (tree.stop_of(&link), tree.time_of(&link).total_seconds()))
            .collect();

        let reversed = tree.reverse(&head);
        let backward: Vec<(StopId, u64)> = tree
            .chain_of(&reversed)
            .map(|link| (tree.stop_of(&link), tree.time_of(&link).total_seconds()))
            .collect();

        let mut expected = forward.clone();
        expected.reverse();
        assert_eq!(backward, expected);

        // the reversed journey accumulates the same metric
        assert_eq!(tree.metric_of(&reversed), tree.metric_of(&head));

        // and reversing twice yields the original sequence again
        let round_trip = tree.reverse(&reversed);
        let restored: Vec<(StopId, u64)> = tree
            .chain_of(&round_trip)
            .map(|link| (tree.stop_of(&link), tree.time_of(&link).total_seconds()))
            .collect();
        assert_eq!(restored, forward);
    }

    #[test]
    fn joined_journeys_stay_enumerable() {
        let mut tree = JourneysTree::<BasicMetric>::new();
        let trip_a = TripId::new(0, 0, 1);
        let trip_b = TripId::new(0, 0, 2);
        let (id_a, ride_a) = connection(0, stop(1), stop(2), 1_000, 300, trip_a);
        let (id_b, ride_b) = connection(1, stop(1), stop(2), 1_000, 300, trip_b);

        let genesis = tree.depart(stop(1), seconds(1_000));
        let via_a = tree.ride_forward(&genesis, id_a, &ride_a);
        let via_b = tree.ride_forward(&genesis, id_b, &ride_b);

        tree.join(&via_a, via_b);
        assert_eq!(tree.alternative(&via_a), Some(via_b));
        assert_eq!(tree.alternative(&via_b), None);

        match tree.kind_of(&via_b) {
            LinkKind::Vehicle { trip, .. } => assert_eq!(trip, trip_b),
            other => panic!("unexpected link kind {:?}", other),
        }
    }

    #[test]
    fn clear_recycles_the_arena() {
        let mut tree = JourneysTree::<BasicMetric>::new();
        tree.depart(stop(1), seconds(0));
        assert_eq!(tree.nb_of_links(), 1);
        tree.clear();
        assert!(tree.is_empty());
    }
}
