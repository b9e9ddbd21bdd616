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

//! A connection-scan journey planning engine for public transit.
//!
//! Timetable data is written once into a [`TransitDatabase`] and read as
//! immutable snapshots ([`TransitData`]) : stops bucketed geographically,
//! trips, and connections sorted by departure time. Three scans run over
//! a snapshot :
//!
//! - [`earliest_arrival::scan`] : the earliest way to reach every stop
//!   after departing from one place,
//! - [`latest_departure::scan`] : its time-reversed dual,
//! - [`profiled::scan`] : every Pareto-optimal departure/metric trade-off
//!   toward one target, over a whole time window.
//!
//! Footpaths between stops come from a [`TransferGenerator`], and a
//! completed one-to-all scan can be turned into an [`IsochroneFilter`]
//! that prunes a later profiled scan down to the reachable part of the
//! network.

extern crate static_assertions;

mod engine;

pub mod config;
pub mod criteria;
pub mod filters;
pub mod identifiers;
pub mod places_nearby;
pub mod response;
pub mod tiles;
pub mod time;
pub mod transfers;
pub mod transit_data;

pub use chrono::NaiveDateTime;
pub use tracing;

pub use engine::{
    earliest_arrival, isochrone, latest_departure, profiled, JourneysTree, Link, LinkKind,
    ParetoFront,
};

pub use config::{ScanParams, StoreParams, TransferParams, ValidationParams};
pub use criteria::{BasicComparator, BasicMetric, Dominance, DominanceComparator, Metric};
pub use engine::earliest_arrival::EarliestArrivalScan;
pub use engine::isochrone::{IsochroneDirection, IsochroneFilter};
pub use engine::latest_departure::LatestDepartureScan;
pub use engine::profiled::{
    MetricGuesser, NoGuesser, ProfiledComparator, ProfiledCriteria, ProfiledScan, TeleportGuesser,
};
pub use filters::{
    CancelledConnectionFilter, ConnectionFilter, FilterAggregator, JourneyFilter,
    MaxVehiclesFilter, NoFilter,
};
pub use identifiers::{ConnectionId, StopId, TripId};
pub use response::{enumerate_alternatives, BadJourney, Journey, Leg, VehicleLeg, WalkLeg};
pub use time::{PositiveDuration, SecondsSinceEpoch, TimeWindow};
pub use transfers::{CrowsFlightTransfers, SameStopTransfers, TransferGenerator};
pub use transit_data::{TransitData, TransitDatabase, TransitDataWriter};
