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

//! A set of mutually incomparable (item, criteria) pairs.
//!
//! The front never stores two elements where one dominates the other,
//! and never stores two elements with equal criteria either : an equal
//! newcomer is either ignored ([`ParetoFront::add`]) or merged into the
//! element that covers it ([`ParetoFront::add_or_merge`]).
//!
//! The comparator is passed to each call rather than stored, so one
//! front can be filled under one order and re-read under another.

use crate::criteria::{Dominance, DominanceComparator};

use std::slice::Iter as SliceIter;

#[derive(Debug)]
pub struct ParetoFront<Item, Crit> {
    elements: Vec<(Item, Crit)>,
}

impl<Item: Clone, Crit: Clone> Clone for ParetoFront<Item, Crit> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
        }
    }
}

impl<Item, Crit> ParetoFront<Item, Crit> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn iter(&self) -> SliceIter<'_, (Item, Crit)> {
        self.elements.iter()
    }

    /// True when some element of the front is at least as good as
    /// `criteria`. An equal element counts : the newcomer brings
    /// nothing new.
    pub fn dominates<C>(&self, criteria: &Crit, comparator: &C) -> bool
    where
        C: DominanceComparator<Crit>,
    {
        self.elements.iter().any(|(_, old_criteria)| {
            matches!(
                comparator.dominance(old_criteria, criteria),
                Dominance::Less | Dominance::Equal
            )
        })
    }

    pub fn remove_elements_dominated_by<C>(&mut self, criteria: &Crit, comparator: &C)
    where
        C: DominanceComparator<Crit>,
    {
        self.elements.retain(|(_, old_criteria)| {
            comparator.dominance(criteria, old_criteria) != Dominance::Less
        });
    }

    /// Insert unless dominated or covered. Returns true when the
    /// element entered the front.
    pub fn add<C>(&mut self, item: Item, criteria: Crit, comparator: &C) -> bool
    where
        C: DominanceComparator<Crit>,
    {
        if self.dominates(&criteria, comparator) {
            return false;
        }
        self.remove_elements_dominated_by(&criteria, comparator);
        self.elements.push((item, criteria));
        true
    }

    /// Insert unless dominated, but when an element with *equal*
    /// criteria is already present, hand the newcomer to `merge`
    /// instead of dropping it.
    ///
    /// Returns true when the newcomer was kept, either as a new
    /// element or merged into an existing one.
    pub fn add_or_merge<C, F>(
        &mut self,
        item: Item,
        criteria: Crit,
        comparator: &C,
        merge: F,
    ) -> bool
    where
        C: DominanceComparator<Crit>,
        F: FnOnce(&mut Item, Item),
    {
        for (old_item, old_criteria) in self.elements.iter_mut() {
            match comparator.dominance(old_criteria, &criteria) {
                Dominance::Less => return false,
                Dominance::Equal => {
                    merge(old_item, item);
                    return true;
                }
                Dominance::Greater | Dominance::Incomparable => {}
            }
        }
        self.remove_elements_dominated_by(&criteria, comparator);
        self.elements.push((item, criteria));
        true
    }

    pub fn merge_with<C>(&mut self, other: &Self, comparator: &C)
    where
        C: DominanceComparator<Crit>,
        Item: Clone,
        Crit: Clone,
    {
        for (item, criteria) in &other.elements {
            self.add(item.clone(), criteria.clone(), comparator);
        }
    }
}

impl<Item, Crit> Default for ParetoFront<Item, Crit> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{BasicComparator, BasicMetric};
    use crate::time::PositiveDuration;

    fn metric(nb_of_vehicles: u32, seconds: u32) -> BasicMetric {
        BasicMetric {
            nb_of_vehicles,
            total_duration: PositiveDuration::from_seconds(seconds),
        }
    }

    fn assert_mutually_incomparable(front: &ParetoFront<&str, BasicMetric>) {
        let comparator = BasicComparator;
        for (index, (_, lhs)) in front.iter().enumerate() {
            for (_, rhs) in front.iter().skip(index + 1) {
                assert_eq!(
                    comparator.dominance(lhs, rhs),
                    Dominance::Incomparable,
                    "{} and {} should not coexist",
                    lhs,
                    rhs
                );
            }
        }
    }

    #[test]
    fn dominated_newcomers_are_rejected() {
        let comparator = BasicComparator;
        let mut front = ParetoFront::new();
        assert!(front.add("direct", metric(1, 1_200), &comparator));
        assert!(!front.add("worse", metric(2, 1_500), &comparator));
        assert_eq!(front.len(), 1);
    }

    #[test]
    fn dominating_newcomers_evict_the_dominated() {
        let comparator = BasicComparator;
        let mut front = ParetoFront::new();
        front.add("slow with changes", metric(3, 1_500), &comparator);
        front.add("express", metric(1, 900), &comparator);
        assert_eq!(front.len(), 1);
        assert_eq!(front.iter().next().map(|(item, _)| *item), Some("express"));
    }

    #[test]
    fn incomparable_elements_coexist() {
        let comparator = BasicComparator;
        let mut front = ParetoFront::new();
        front.add("express", metric(2, 600), &comparator);
        front.add("direct", metric(1, 1_200), &comparator);
        front.add("middle", metric(1, 900), &comparator);
        // "direct" is evicted by "middle", "express" survives
        assert_eq!(front.len(), 2);
        assert_mutually_incomparable(&front);
    }

    #[test]
    fn equal_criteria_are_covered_not_duplicated() {
        let comparator = BasicComparator;
        let mut front = ParetoFront::new();
        assert!(front.add("first", metric(1, 600), &comparator));
        assert!(!front.add("twin", metric(1, 600), &comparator));
        assert_eq!(front.len(), 1);
    }

    #[test]
    fn add_or_merge_hands_equals_to_the_closure() {
        let comparator = BasicComparator;
        let mut front: ParetoFront<Vec<&str>, BasicMetric> = ParetoFront::new();
        front.add_or_merge(vec!["first"], metric(1, 600), &comparator, |_, _| {
            panic!("nothing to merge into an empty front")
        });
        let kept = front.add_or_merge(vec!["twin"], metric(1, 600), &comparator, |old, new| {
            old.extend(new)
        });
        assert!(kept);
        assert_eq!(front.len(), 1);
        assert_eq!(front.iter().next().map(|(item, _)| item.clone()), Some(vec!["first", "twin"]));

        // a dominated newcomer still never reaches the closure
        let kept = front.add_or_merge(vec!["worse"], metric(2, 900), &comparator, |_, _| {
            panic!("dominated elements are not merged")
        });
        assert!(!kept);
    }

    #[test]
    fn merge_with_keeps_the_union_front() {
        let comparator = BasicComparator;
        let mut left = ParetoFront::new();
        left.add("express", metric(2, 600), &comparator);
        left.add("direct", metric(1, 1_200), &comparator);
        let mut right = ParetoFront::new();
        right.add("middle", metric(1, 900), &comparator);
        right.add("hopeless", metric(4, 2_000), &comparator);

        left.merge_with(&right, &comparator);
        assert_eq!(left.len(), 2);
        assert_mutually_incomparable(&left);
    }
}
