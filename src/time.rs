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

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// A point in time, stored as a number of seconds since the Unix epoch (UTC).
///
/// All timetable data handled by the engine is expressed in this unambiguous
/// form. Conversions from/to timezoned wall-clock times belong to the caller.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SecondsSinceEpoch {
    seconds: u64,
}

impl SecondsSinceEpoch {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_unix_seconds(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn total_seconds(&self) -> u64 {
        self.seconds
    }

    /// Duration elapsed between `earlier` and `self`.
    /// Returns None when `earlier` is actually later than `self`,
    /// or when the gap does not fit a `PositiveDuration`.
    pub fn duration_since(&self, earlier: &SecondsSinceEpoch) -> Option<PositiveDuration> {
        let gap = self.seconds.checked_sub(earlier.seconds)?;
        let seconds = u32::try_from(gap).ok()?;
        Some(PositiveDuration { seconds })
    }

    pub fn checked_sub(&self, duration: PositiveDuration) -> Option<SecondsSinceEpoch> {
        let seconds = self.seconds.checked_sub(u64::from(duration.seconds))?;
        Some(Self { seconds })
    }

    pub fn from_datetime(datetime: &NaiveDateTime) -> Option<Self> {
        let timestamp = datetime.and_utc().timestamp();
        let seconds = u64::try_from(timestamp).ok()?;
        Some(Self { seconds })
    }

    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let timestamp = i64::try_from(self.seconds).ok()?;
        DateTime::from_timestamp(timestamp, 0).map(|datetime| datetime.naive_utc())
    }
}

impl Display for SecondsSinceEpoch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Some(datetime) => write!(f, "{}", datetime.format("%Y%m%dT%H%M%S")),
            None => write!(f, "{}s since epoch", self.seconds),
        }
    }
}

impl std::ops::Add<PositiveDuration> for SecondsSinceEpoch {
    type Output = Self;

    fn add(self, rhs: PositiveDuration) -> Self::Output {
        Self {
            seconds: self.seconds + u64::from(rhs.seconds),
        }
    }
}

/// A non-negative duration, with a second resolution.
#[derive(
    Debug, Eq, PartialEq, Clone, Copy, Ord, PartialOrd, Hash, Serialize, Deserialize, Default,
)]
pub struct PositiveDuration {
    pub(crate) seconds: u32,
}

impl PositiveDuration {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> PositiveDuration {
        let total_seconds = seconds + 60 * minutes + 60 * 60 * hours;
        PositiveDuration {
            seconds: total_seconds,
        }
    }

    pub const fn from_seconds(seconds: u32) -> PositiveDuration {
        PositiveDuration { seconds }
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.seconds)
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0
    }
}

impl Display for PositiveDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hours = self.seconds / (60 * 60);
        let minutes_in_secs = self.seconds % (60 * 60);
        let minutes = minutes_in_secs / 60;
        let seconds = minutes_in_secs % 60;
        if hours != 0 {
            write!(f, "{}h{:02}m{:02}s", hours, minutes, seconds)
        } else if minutes != 0 {
            write!(f, "{}m{:02}s", minutes, seconds)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PositiveDurationParseError {
    string_to_parse: String,
}

impl Display for PositiveDurationParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unable to parse '{}' as a duration. Expected format is 'hh:mm:ss'.",
            self.string_to_parse
        )
    }
}

impl std::error::Error for PositiveDurationParseError {}

impl FromStr for PositiveDuration {
    type Err = PositiveDurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PositiveDurationParseError {
            string_to_parse: s.to_string(),
        };
        let mut fields = s.split(':');
        let hours: u32 = fields
            .next()
            .and_then(|field| field.parse().ok())
            .ok_or_else(err)?;
        let minutes: u32 = fields
            .next()
            .and_then(|field| field.parse().ok())
            .ok_or_else(err)?;
        let seconds: u32 = fields
            .next()
            .and_then(|field| field.parse().ok())
            .ok_or_else(err)?;
        if fields.next().is_some() || minutes > 59 || seconds > 59 {
            return Err(err());
        }
        Ok(PositiveDuration::from_hms(hours, minutes, seconds))
    }
}

impl std::ops::Add for PositiveDuration {
    type Output = PositiveDuration;

    fn add(self, other: Self) -> Self::Output {
        PositiveDuration {
            seconds: self.seconds + other.seconds,
        }
    }
}

impl std::ops::Mul<u32> for PositiveDuration {
    type Output = PositiveDuration;

    fn mul(self, rhs: u32) -> Self::Output {
        PositiveDuration {
            seconds: self.seconds * rhs,
        }
    }
}

/// The slice of time `[start, end]` over which a scan operates.
///
/// Both bounds are inclusive. Construction panics when `start > end`,
/// since such a window is always a caller bug.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: SecondsSinceEpoch,
    end: SecondsSinceEpoch,
}

impl TimeWindow {
    pub fn new(start: SecondsSinceEpoch, end: SecondsSinceEpoch) -> Self {
        assert!(
            start <= end,
            "Bad time window : start {} is after end {}",
            start,
            end
        );
        Self { start, end }
    }

    pub fn start(&self) -> SecondsSinceEpoch {
        self.start
    }

    pub fn end(&self) -> SecondsSinceEpoch {
        self.end
    }

    pub fn contains(&self, time: &SecondsSinceEpoch) -> bool {
        self.start <= *time && *time <= self.end
    }

    pub fn duration(&self) -> PositiveDuration {
        self.end
            .duration_since(&self.start)
            .unwrap_or_else(|| PositiveDuration::from_seconds(u32::MAX))
    }

    /// The same window with its end pulled back so that the window is
    /// no longer than `max_duration`. The start never moves.
    pub fn truncated_to(&self, max_duration: PositiveDuration) -> TimeWindow {
        let capped_end = self.start + max_duration;
        TimeWindow {
            start: self.start,
            end: std::cmp::min(self.end, capped_end),
        }
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_since_is_checked() {
        let earlier = SecondsSinceEpoch::from_unix_seconds(1_000);
        let later = SecondsSinceEpoch::from_unix_seconds(1_600);
        assert_eq!(
            later.duration_since(&earlier),
            Some(PositiveDuration::from_seconds(600))
        );
        assert_eq!(earlier.duration_since(&later), None);
    }

    #[test]
    fn add_duration_to_epoch_seconds() {
        let time = SecondsSinceEpoch::from_unix_seconds(100);
        let moved = time + PositiveDuration::from_hms(0, 10, 0);
        assert_eq!(moved.total_seconds(), 700);
    }

    #[test]
    fn parse_duration() {
        assert_eq!(
            PositiveDuration::from_str("00:02:00").ok(),
            Some(PositiveDuration::from_seconds(120))
        );
        assert_eq!(
            PositiveDuration::from_str("26:00:30").ok(),
            Some(PositiveDuration::from_seconds(26 * 3600 + 30))
        );
        assert!(PositiveDuration::from_str("1:90:00").is_err());
        assert!(PositiveDuration::from_str("humpty").is_err());
    }

    #[test]
    fn truncating_a_window_never_moves_its_start() {
        let window = TimeWindow::new(
            SecondsSinceEpoch::from_unix_seconds(1_000),
            SecondsSinceEpoch::from_unix_seconds(100_000),
        );
        let capped = window.truncated_to(PositiveDuration::from_hms(1, 0, 0));
        assert_eq!(capped.start(), window.start());
        assert_eq!(capped.end().total_seconds(), 4_600);
        assert_eq!(capped.duration(), PositiveDuration::from_hms(1, 0, 0));

        // a window already short enough is left alone
        let untouched = window.truncated_to(PositiveDuration::from_hms(48, 0, 0));
        assert_eq!(untouched, window);
    }

    #[test]
    fn display_duration() {
        assert_eq!(PositiveDuration::from_hms(1, 2, 3).to_string(), "1h02m03s");
        assert_eq!(PositiveDuration::from_hms(0, 5, 0).to_string(), "5m00s");
        assert_eq!(PositiveDuration::from_seconds(42).to_string(), "42s");
    }

    #[test]
    #[should_panic]
    fn backward_time_window_panics() {
        let start = SecondsSinceEpoch::from_unix_seconds(200);
        let end = SecondsSinceEpoch::from_unix_seconds(100);
        let _ = TimeWindow::new(start, end);
    }

    #[test]
    fn time_window_contains_its_bounds() {
        let window = TimeWindow::new(
            SecondsSinceEpoch::from_unix_seconds(100),
            SecondsSinceEpoch::from_unix_seconds(200),
        );
        assert!(window.contains(&SecondsSinceEpoch::from_unix_seconds(100)));
        assert!(window.contains(&SecondsSinceEpoch::from_unix_seconds(200)));
        assert!(!window.contains(&SecondsSinceEpoch::from_unix_seconds(201)));
    }
}
