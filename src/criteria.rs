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

//! What makes one journey better than another.
//!
//! A `Metric` is a value accumulated along a journey, one `chain` call
//! per leg, and a `DominanceComparator` is the partial order used to
//! compare two accumulated values. The engine is generic over both, and
//! everything is resolved at compile time : a scan over a custom metric
//! carries no virtual dispatch in its hot loop.

use crate::{
    identifiers::{StopId, TripId},
    time::{PositiveDuration, SecondsSinceEpoch},
};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Outcome of comparing two metric values under a partial order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// the left value dominates (is better)
    Less,
    /// the right value dominates
    Greater,
    Equal,
    /// neither dominates : both are worth keeping
    Incomparable,
}

impl Dominance {
    pub fn from_ord(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Dominance::Less,
            Ordering::Greater => Dominance::Greater,
            Ordering::Equal => Dominance::Equal,
        }
    }

    /// Product order : the combination dominates only when every
    /// component agrees (or ties).
    pub fn combine(self, other: Dominance) -> Dominance {
        use Dominance::{Equal, Greater, Incomparable, Less};
        match (self, other) {
            (Less, Less) | (Less, Equal) | (Equal, Less) => Less,
            (Greater, Greater) | (Greater, Equal) | (Equal, Greater) => Greater,
            (Equal, Equal) => Equal,
            _ => Incomparable,
        }
    }
}

pub trait DominanceComparator<Criteria> {
    fn dominance(&self, lhs: &Criteria, rhs: &Criteria) -> Dominance;
}

/// What the previous end of a journey was riding when a new leg is
/// chained onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousLeg {
    /// the journey had not moved yet
    Genesis,
    Walk,
    Vehicle(TripId),
}

/// One new leg, as seen by `Metric::chain`.
///
/// `new_trip` is `None` for special (non-vehicle) legs. Times are not
/// ordered between `previous_time` and `new_time` : backward-built
/// journeys chain toward earlier times.
#[derive(Debug, Clone, Copy)]
pub struct ChainStep {
    pub previous_time: SecondsSinceEpoch,
    pub previous_leg: PreviousLeg,
    pub new_stop: StopId,
    pub new_time: SecondsSinceEpoch,
    pub new_trip: Option<TripId>,
}

impl ChainStep {
    /// Absolute time gap covered by this leg.
    pub fn elapsed(&self) -> PositiveDuration {
        self.new_time
            .duration_since(&self.previous_time)
            .or_else(|| self.previous_time.duration_since(&self.new_time))
            .unwrap_or_else(PositiveDuration::zero)
    }

    /// True when this leg boards a vehicle the journey was not
    /// already riding. Walking never acquires a vehicle, staying on
    /// the same trip never acquires one either.
    pub fn acquires_a_vehicle(&self) -> bool {
        match self.new_trip {
            None => false,
            Some(new_trip) => match self.previous_leg {
                PreviousLeg::Vehicle(previous_trip) => previous_trip != new_trip,
                PreviousLeg::Genesis | PreviousLeg::Walk => true,
            },
        }
    }
}

/// A value accumulated leg by leg along a journey.
pub trait Metric: Clone + std::fmt::Debug {
    /// The metric of a journey that has not moved yet.
    fn zero() -> Self;

    /// The metric after appending one more leg.
    fn chain(&self, step: &ChainStep) -> Self;
}

/// The canonical metric : how many vehicles were taken, and how much
/// time went by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicMetric {
    pub nb_of_vehicles: u32,
    pub total_duration: PositiveDuration,
}

impl Metric for BasicMetric {
    fn zero() -> Self {
        Self {
            nb_of_vehicles: 0,
            total_duration: PositiveDuration::zero(),
        }
    }

    fn chain(&self, step: &ChainStep) -> Self {
        let nb_of_vehicles = if step.acquires_a_vehicle() {
            self.nb_of_vehicles + 1
        } else {
            self.nb_of_vehicles
        };
        Self {
            nb_of_vehicles,
            total_duration: self.total_duration + step.elapsed(),
        }
    }
}

impl Display for BasicMetric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} vehicles in {}",
            self.nb_of_vehicles, self.total_duration
        )
    }
}

/// Product order over `BasicMetric` : fewer vehicles and less time both
/// count, neither outweighs the other.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicComparator;

impl DominanceComparator<BasicMetric> for BasicComparator {
    fn dominance(&self, lhs: &BasicMetric, rhs: &BasicMetric) -> Dominance {
        let vehicles = Dominance::from_ord(lhs.nb_of_vehicles.cmp(&rhs.nb_of_vehicles));
        let duration = Dominance::from_ord(lhs.total_duration.cmp(&rhs.total_duration));
        vehicles.combine(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(nb_of_vehicles: u32, seconds: u32) -> BasicMetric {
        BasicMetric {
            nb_of_vehicles,
            total_duration: PositiveDuration::from_seconds(seconds),
        }
    }

    fn step(
        previous_time: u64,
        previous_leg: PreviousLeg,
        new_time: u64,
        new_trip: Option<TripId>,
    ) -> ChainStep {
        ChainStep {
            previous_time: SecondsSinceEpoch::from_unix_seconds(previous_time),
            previous_leg,
            new_stop: StopId::new(0, 0, 0),
            new_time: SecondsSinceEpoch::from_unix_seconds(new_time),
            new_trip,
        }
    }

    #[test]
    fn dominance_is_antisymmetric() {
        let comparator = BasicComparator;
        let small = metric(1, 600);
        let large = metric(2, 900);
        assert_eq!(comparator.dominance(&small, &large), Dominance::Less);
        assert_eq!(comparator.dominance(&large, &small), Dominance::Greater);
        assert_eq!(comparator.dominance(&small, &small), Dominance::Equal);
    }

    #[test]
    fn mixed_strengths_are_incomparable() {
        let comparator = BasicComparator;
        let fast_with_changes = metric(3, 600);
        let slow_direct = metric(1, 1_200);
        assert_eq!(
            comparator.dominance(&fast_with_changes, &slow_direct),
            Dominance::Incomparable
        );
        assert_eq!(
            comparator.dominance(&slow_direct, &fast_with_changes),
            Dominance::Incomparable
        );
    }

    #[test]
    fn first_vehicle_counts_from_genesis() {
        let trip = TripId::new(0, 0, 1);
        let chained = BasicMetric::zero().chain(&step(0, PreviousLeg::Genesis, 600, Some(trip)));
        assert_eq!(chained.nb_of_vehicles, 1);
        assert_eq!(chained.total_duration.total_seconds(), 600);
    }

    #[test]
    fn staying_on_the_same_trip_is_free() {
        let trip = TripId::new(0, 0, 1);
        let base = metric(1, 600);
        let chained = base.chain(&step(600, PreviousLeg::Vehicle(trip), 900, Some(trip)));
        assert_eq!(chained.nb_of_vehicles, 1);
        assert_eq!(chained.total_duration.total_seconds(), 900);
    }

    #[test]
    fn changing_trip_costs_a_vehicle() {
        let first = TripId::new(0, 0, 1);
        let second = TripId::new(0, 0, 2);
        let base = metric(1, 600);
        let chained = base.chain(&step(600, PreviousLeg::Vehicle(first), 900, Some(second)));
        assert_eq!(chained.nb_of_vehicles, 2);
    }

    #[test]
    fn walking_is_not_a_vehicle_but_boarding_after_a_walk_is() {
        let trip = TripId::new(0, 0, 1);
        let base = metric(1, 600);
        let walked = base.chain(&step(600, PreviousLeg::Vehicle(trip), 700, None));
        assert_eq!(walked.nb_of_vehicles, 1);
        // even boarding the same trip again after a walk counts
        let boarded = walked.chain(&step(700, PreviousLeg::Walk, 1_000, Some(trip)));
        assert_eq!(boarded.nb_of_vehicles, 2);
        assert_eq!(boarded.total_duration.total_seconds(), 1_000);
    }

    #[test]
    fn backward_chains_accumulate_the_same_durations() {
        let trip = TripId::new(0, 0, 1);
        let chained =
            BasicMetric::zero().chain(&step(1_000, PreviousLeg::Genesis, 400, Some(trip)));
        assert_eq!(chained.total_duration.total_seconds(), 600);
        assert_eq!(chained.nb_of_vehicles, 1);
    }
}
