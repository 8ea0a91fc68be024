//! Fixed vocabularies for the city, month and day selections.
//!
//! Every selection is parsed into a typed value up front, so the loader never
//! works with raw strings past this point.

use std::fmt;
use std::str::FromStr;

use crate::error::{BikeshareError, Result};

/// Keyword accepted for "no month filter" and "no day filter".
pub const ALL: &str = "All";

/// The supported cities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    pub fn name(self) -> &'static str {
        match self {
            City::Chicago => "Chicago",
            City::NewYorkCity => "New York City",
            City::Washington => "Washington",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for City {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        City::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| BikeshareError::UnknownCity(s.to_string()))
    }
}

/// Months covered by the trip data, January through June.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Month {
    January = 1,
    February,
    March,
    April,
    May,
    June,
}

impl Month {
    pub const ALL: [Month; 6] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
    ];

    /// Calendar number, January = 1.
    pub fn number(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        month_name(self.number()).unwrap_or_default()
    }
}

impl FromStr for Month {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Month::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| BikeshareError::InvalidFilter {
                kind: "month",
                value: s.to_string(),
            })
    }
}

/// Day of the week, Monday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
        DayOfWeek::Sun,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Three-letter form used by the filter vocabulary.
    pub fn abbreviation(self) -> &'static str {
        match self {
            DayOfWeek::Mon => "Mon",
            DayOfWeek::Tue => "Tue",
            DayOfWeek::Wed => "Wed",
            DayOfWeek::Thu => "Thu",
            DayOfWeek::Fri => "Fri",
            DayOfWeek::Sat => "Sat",
            DayOfWeek::Sun => "Sun",
        }
    }

    pub fn name(self) -> &'static str {
        day_name(self.index()).unwrap_or_default()
    }
}

impl FromStr for DayOfWeek {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        DayOfWeek::ALL
            .into_iter()
            .find(|d| d.abbreviation().eq_ignore_ascii_case(s))
            .ok_or_else(|| BikeshareError::InvalidFilter {
                kind: "day",
                value: s.to_string(),
            })
    }
}

/// Full calendar month name for `1..=12`.
pub fn month_name(month: u32) -> Option<&'static str> {
    u8::try_from(month)
        .ok()
        .and_then(|m| chrono::Month::try_from(m).ok())
        .map(|m| m.name())
}

/// Full weekday name for `0..=6`, Monday first.
pub fn day_name(index: u32) -> Option<&'static str> {
    const NAMES: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
    NAMES.get(index as usize).copied()
}

/// A validated city/month/day selection. `None` means "All".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSelection {
    pub city: City,
    pub month: Option<Month>,
    pub day: Option<DayOfWeek>,
}

impl FilterSelection {
    /// Parses the three raw selections, failing on the first value outside
    /// its vocabulary.
    pub fn parse(city: &str, month: &str, day: &str) -> Result<Self> {
        Ok(Self {
            city: city.parse()?,
            month: parse_optional(month)?,
            day: parse_optional(day)?,
        })
    }
}

fn parse_optional<T: FromStr<Err = BikeshareError>>(value: &str) -> Result<Option<T>> {
    if value.trim().eq_ignore_ascii_case(ALL) {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}
