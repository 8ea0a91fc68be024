//! Trip records and the immutable record set the statistics run over.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::filter::{City, DayOfWeek, Month};

/// Rider gender as recorded by the operator. Blank cells become `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gender {
    Female,
    Male,
    Unknown,
}

impl Gender {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            s if s.eq_ignore_ascii_case("male") => Gender::Male,
            s if s.eq_ignore_ascii_case("female") => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::Unknown => "Not Available",
        }
    }
}

/// One bikeshare trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub start_time: NaiveDateTime,
    pub start_station: String,
    pub end_station: String,
    /// Seconds.
    pub trip_duration: f64,
    pub gender: Option<Gender>,
    pub birth_year: Option<i32>,
    /// Calendar month of `start_time`, January = 1.
    pub month: u32,
    /// Weekday of `start_time`, Monday = 0.
    pub day_of_week: u32,
}

impl TripRecord {
    /// Builds a record, deriving `month` and `day_of_week` from `start_time`.
    pub fn new(
        start_time: NaiveDateTime,
        start_station: impl Into<String>,
        end_station: impl Into<String>,
        trip_duration: f64,
    ) -> Self {
        Self {
            start_time,
            start_station: start_station.into(),
            end_station: end_station.into(),
            trip_duration,
            gender: None,
            birth_year: None,
            month: start_time.month(),
            day_of_week: start_time.weekday().num_days_from_monday(),
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_birth_year(mut self, birth_year: Option<i32>) -> Self {
        self.birth_year = birth_year;
        self
    }

    pub fn hour(&self) -> u32 {
        self.start_time.hour()
    }

    pub fn matches(&self, month: Option<Month>, day: Option<DayOfWeek>) -> bool {
        month.is_none_or(|m| self.month == m.number())
            && day.is_none_or(|d| self.day_of_week == d.index())
    }
}

/// Trip records for one city, optionally narrowed by month and day.
///
/// The optional-column flags are fixed when the source is read and carried
/// through every filter.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    city: City,
    has_gender: bool,
    has_birth_year: bool,
    records: Vec<TripRecord>,
}

impl RecordSet {
    pub fn new(
        city: City,
        has_gender: bool,
        has_birth_year: bool,
        records: Vec<TripRecord>,
    ) -> Self {
        Self {
            city,
            has_gender,
            has_birth_year,
            records,
        }
    }

    pub fn city(&self) -> City {
        self.city
    }

    pub fn has_gender(&self) -> bool {
        self.has_gender
    }

    pub fn has_birth_year(&self) -> bool {
        self.has_birth_year
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a new set holding the records that match both filters.
    pub fn filter(&self, month: Option<Month>, day: Option<DayOfWeek>) -> RecordSet {
        RecordSet {
            city: self.city,
            has_gender: self.has_gender,
            has_birth_year: self.has_birth_year,
            records: self
                .records
                .iter()
                .filter(|r| r.matches(month, day))
                .cloned()
                .collect(),
        }
    }
}
