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

//! Identifiers of stops, trips and connections.
//!
//! An identifier is a `(database_id, tile_id, local_id)` triple.
//! The `database_id` tells which logical database owns the object, so that
//! objects coming from several merged databases never collide. The `tile_id`
//! names the storage bucket inside that database, and the `local_id` is a
//! sequence number inside the bucket. Appending to one bucket never
//! renumbers the others.
//!
//! Stops are bucketed by the web-mercator tile containing their coordinate.
//! Trips carry no geography and all live in a single bucket. Connections are
//! bucketed by the tile of their departure stop.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const INVALID_PART: u32 = u32::MAX;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StopId {
    pub database_id: u32,
    pub tile_id: u32,
    pub local_id: u32,
}

impl StopId {
    pub const INVALID: StopId = StopId {
        database_id: INVALID_PART,
        tile_id: INVALID_PART,
        local_id: INVALID_PART,
    };

    pub fn new(database_id: u32, tile_id: u32, local_id: u32) -> Self {
        Self {
            database_id,
            tile_id,
            local_id,
        }
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Display for StopId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "stop:{}-{}-{}",
            self.database_id, self.tile_id, self.local_id
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TripId {
    pub database_id: u32,
    pub tile_id: u32,
    pub local_id: u32,
}

impl TripId {
    pub const INVALID: TripId = TripId {
        database_id: INVALID_PART,
        tile_id: INVALID_PART,
        local_id: INVALID_PART,
    };

    pub fn new(database_id: u32, tile_id: u32, local_id: u32) -> Self {
        Self {
            database_id,
            tile_id,
            local_id,
        }
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Display for TripId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "trip:{}-{}-{}",
            self.database_id, self.tile_id, self.local_id
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ConnectionId {
    pub database_id: u32,
    pub tile_id: u32,
    pub local_id: u32,
}

impl ConnectionId {
    pub const INVALID: ConnectionId = ConnectionId {
        database_id: INVALID_PART,
        tile_id: INVALID_PART,
        local_id: INVALID_PART,
    };

    pub fn new(database_id: u32, tile_id: u32, local_id: u32) -> Self {
        Self {
            database_id,
            tile_id,
            local_id,
        }
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Display for ConnectionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "connection:{}-{}-{}",
            self.database_id, self.tile_id, self.local_id
        )
    }
}
