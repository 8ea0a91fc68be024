//! CSV trip-log loader.
//!
//! Resolves a city to its source, parses every row into a [`TripRecord`] and
//! applies the month/day filters. A single unparseable timestamp rejects the
//! whole load.

use std::io::Read;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::error::{BikeshareError, Result};
use crate::filter::{City, DayOfWeek, FilterSelection, Month};
use crate::record::{Gender, RecordSet, TripRecord};
use crate::source::TripSource;

pub const START_TIME: &str = "Start Time";
pub const START_STATION: &str = "Start Station";
pub const END_STATION: &str = "End Station";
pub const TRIP_DURATION: &str = "Trip Duration";
pub const GENDER: &str = "Gender";
pub const BIRTH_YEAR: &str = "Birth Year";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Loads filtered record sets from a [`TripSource`].
pub struct Loader<S> {
    source: S,
}

impl<S: TripSource> Loader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Validates the raw selections and loads the matching records.
    pub fn load(&self, city: &str, month: &str, day: &str) -> Result<RecordSet> {
        let selection = FilterSelection::parse(city, month, day)?;
        self.load_selection(&selection)
    }

    #[tracing::instrument(skip(self), fields(city = %selection.city))]
    pub fn load_selection(&self, selection: &FilterSelection) -> Result<RecordSet> {
        let reader = self.source.open(selection.city)?;
        let all = read_records(selection.city, reader)?;
        let filtered = apply_filters(all, selection.month, selection.day);

        info!(
            records = filtered.len(),
            month = ?selection.month,
            day = ?selection.day,
            "Record set loaded"
        );
        Ok(filtered)
    }
}

fn apply_filters(all: RecordSet, month: Option<Month>, day: Option<DayOfWeek>) -> RecordSet {
    if month.is_none() && day.is_none() {
        all
    } else {
        all.filter(month, day)
    }
}

/// Column positions resolved once from the header row.
struct Columns {
    start_time: usize,
    start_station: usize,
    end_station: usize,
    trip_duration: usize,
    gender: Option<usize>,
    birth_year: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(BikeshareError::MissingColumn(name));

        Ok(Self {
            start_time: require(START_TIME)?,
            start_station: require(START_STATION)?,
            end_station: require(END_STATION)?,
            trip_duration: require(TRIP_DURATION)?,
            gender: find(GENDER),
            birth_year: find(BIRTH_YEAR),
        })
    }
}

/// Parses an unfiltered record set for `city` from raw CSV.
pub fn read_records<R: Read>(city: City, reader: R) -> Result<RecordSet> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::resolve(rdr.headers()?)?;
    debug!(
        has_gender = columns.gender.is_some(),
        has_birth_year = columns.birth_year.is_some(),
        "Resolved source columns"
    );

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        records.push(parse_row(&row, &columns)?);
    }

    Ok(RecordSet::new(
        city,
        columns.gender.is_some(),
        columns.birth_year.is_some(),
        records,
    ))
}

fn parse_row(row: &StringRecord, columns: &Columns) -> Result<TripRecord> {
    let line = row.position().map(|p| p.line()).unwrap_or_default();
    let cell = |i: usize| row.get(i).unwrap_or_default();

    let raw_time = cell(columns.start_time);
    let start_time = parse_timestamp(raw_time).ok_or_else(|| BikeshareError::MalformedTimestamp {
        line,
        value: raw_time.to_string(),
    })?;

    let raw_duration = cell(columns.trip_duration);
    let trip_duration = raw_duration
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| BikeshareError::MalformedField {
            column: TRIP_DURATION,
            line,
            value: raw_duration.to_string(),
        })?;

    let required = |i: usize, column: &'static str| match cell(i) {
        "" => Err(BikeshareError::MalformedField {
            column,
            line,
            value: String::new(),
        }),
        value => Ok(value),
    };

    let mut record = TripRecord::new(
        start_time,
        required(columns.start_station, START_STATION)?,
        required(columns.end_station, END_STATION)?,
        trip_duration,
    );

    if let Some(i) = columns.gender {
        record = record.with_gender(Gender::parse(cell(i)));
    }
    if let Some(i) = columns.birth_year {
        record = record.with_birth_year(parse_birth_year(cell(i), line)?);
    }

    Ok(record)
}

/// Parses a `Start Time` cell, e.g. `2017-01-01 09:07:57`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

// Birth years are exported as floats ("1989.0"); blanks are unknown.
fn parse_birth_year(raw: &str, line: u64) -> Result<Option<i32>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|y| y.is_finite() && y.fract() == 0.0)
        .and_then(|y| i32::try_from(y as i64).ok())
        .map(Some)
        .ok_or_else(|| BikeshareError::MalformedField {
            column: BIRTH_YEAR,
            line,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;

    const CHICAGO: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1,2017-01-01 09:07:57,2017-01-01 09:20:53,776,Canal St & Adams St,Clinton St & Madison St,Subscriber,Male,1984.0
2,2017-01-02 13:00:00,2017-01-02 13:10:00,600,Canal St & Adams St,State St & Kinzie St,Subscriber,,
3,2017-02-05 08:15:00,2017-02-05 08:30:00,900,Wells St & Elm St,Canal St & Adams St,Customer,Female,1990.0
";

    const WASHINGTON: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1,2017-06-21 08:36:34,2017-06-21 08:44:43,489.066,14th & Belmont St NW,15th & K St NW,Subscriber
2,2017-03-11 10:55:00,2017-03-11 11:15:00,1200.5,Lincoln Memorial,Jefferson Memorial,Customer
";

    struct InMemory(HashMap<City, &'static str>);

    impl TripSource for InMemory {
        fn open(&self, city: City) -> Result<Box<dyn Read + Send>> {
            let body = self.0.get(&city).copied().unwrap_or_default();
            Ok(Box::new(Cursor::new(body)))
        }
    }

    fn loader() -> Loader<InMemory> {
        Loader::new(InMemory(HashMap::from([
            (City::Chicago, CHICAGO),
            (City::Washington, WASHINGTON),
        ])))
    }

    #[test]
    fn test_read_all_rows() {
        let set = read_records(City::Chicago, CHICAGO.as_bytes()).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.has_gender());
        assert!(set.has_birth_year());

        let first = &set.records()[0];
        assert_eq!(first.start_station, "Canal St & Adams St");
        assert_eq!(first.trip_duration, 776.0);
        assert_eq!(first.gender, Some(Gender::Male));
        assert_eq!(first.birth_year, Some(1984));
    }

    #[test]
    fn test_blank_optional_cells() {
        let set = read_records(City::Chicago, CHICAGO.as_bytes()).unwrap();
        let second = &set.records()[1];
        assert_eq!(second.gender, Some(Gender::Unknown));
        assert_eq!(second.birth_year, None);
    }

    #[test]
    fn test_source_without_optional_columns() {
        let set = read_records(City::Washington, WASHINGTON.as_bytes()).unwrap();
        assert!(!set.has_gender());
        assert!(!set.has_birth_year());
        assert!(set.records().iter().all(|r| r.gender.is_none()));
        assert_eq!(set.records()[0].trip_duration, 489.066);
    }

    #[test]
    fn test_malformed_timestamp_rejects_load() {
        let csv = "Start Time,Start Station,End Station,Trip Duration\n\
                   2017-01-01 09:07:57,A,B,10\n\
                   not a time,A,B,10\n";
        let err = read_records(City::Chicago, csv.as_bytes()).unwrap_err();
        match err {
            BikeshareError::MalformedTimestamp { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "not a time");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "Start Time,Start Station,Trip Duration\n2017-01-01 09:07:57,A,10\n";
        let err = read_records(City::Chicago, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, BikeshareError::MissingColumn(END_STATION)));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let csv = "Start Time,Start Station,End Station,Trip Duration\n2017-01-01 09:07:57,A,B,-5\n";
        let err = read_records(City::Chicago, csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            BikeshareError::MalformedField { column: TRIP_DURATION, .. }
        ));
    }

    #[test]
    fn test_short_row_rejected() {
        let csv = "Start Time,Start Station,End Station,Trip Duration\n\
                   2017-01-01 09:07:57,A,B,10\n\
                   2017-01-02 09:07:57,10\n";
        let err = read_records(City::Chicago, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, BikeshareError::Csv(_)));
    }

    #[test]
    fn test_blank_station_rejected() {
        let csv = "Start Time,Start Station,End Station,Trip Duration\n\
                   2017-01-01 09:07:57,A,,10\n";
        let err = read_records(City::Chicago, csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            BikeshareError::MalformedField { column: END_STATION, line: 2, .. }
        ));

        let csv = "Start Time,Start Station,End Station,Trip Duration\n\
                   2017-01-01 09:07:57, ,B,10\n";
        let err = read_records(City::Chicago, csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            BikeshareError::MalformedField { column: START_STATION, .. }
        ));
    }

    #[test]
    fn test_birth_year_values() {
        assert_eq!(parse_birth_year("1989.0", 2).unwrap(), Some(1989));
        assert_eq!(parse_birth_year("1975", 2).unwrap(), Some(1975));
        assert_eq!(parse_birth_year("", 2).unwrap(), None);

        for raw in ["1989.5", "abc", "1e12", "-3000000000", "inf"] {
            let err = parse_birth_year(raw, 7).unwrap_err();
            assert!(
                matches!(err, BikeshareError::MalformedField { column: BIRTH_YEAR, line: 7, .. }),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_malformed_birth_year_rejects_load() {
        let csv = "Start Time,Start Station,End Station,Trip Duration,Birth Year\n\
                   2017-01-01 09:07:57,A,B,10,1e12\n";
        let err = read_records(City::Chicago, csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            BikeshareError::MalformedField { column: BIRTH_YEAR, line: 2, .. }
        ));
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2017-01-01 09:07:57").is_some());
        assert!(parse_timestamp("2017-01-01 09:07:57.250").is_some());
        assert!(parse_timestamp("2017-01-01T09:07:57").is_some());
        assert!(parse_timestamp("2017-01-01 09:07").is_some());
        assert!(parse_timestamp("01/01/2017").is_none());
    }

    #[test]
    fn test_load_all_keeps_every_row() {
        let set = loader().load("Chicago", "All", "All").unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_load_month_filter() {
        let set = loader().load("Chicago", "February", "All").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.records()[0].month, 2);
    }

    #[test]
    fn test_load_filters_are_intersection() {
        let l = loader();
        let month = l.load("Chicago", "January", "All").unwrap();
        let day = l.load("Chicago", "All", "Sun").unwrap();
        let both = l.load("Chicago", "January", "Sun").unwrap();

        let expected: Vec<_> = month
            .records()
            .iter()
            .filter(|r| day.records().contains(r))
            .cloned()
            .collect();
        assert_eq!(both.records(), expected.as_slice());
        assert_eq!(both.len(), 1);
    }

    #[test]
    fn test_load_empty_result_is_not_an_error() {
        let set = loader().load("Washington", "January", "All").unwrap();
        assert!(set.is_empty());
        assert_eq!(set.city(), City::Washington);
    }

    #[test]
    fn test_load_rejects_bad_selection() {
        let l = loader();
        assert!(matches!(
            l.load("Boston", "All", "All"),
            Err(BikeshareError::UnknownCity(_))
        ));
        assert!(matches!(
            l.load("Chicago", "July", "All"),
            Err(BikeshareError::InvalidFilter { kind: "month", .. })
        ));
        assert!(matches!(
            l.load("Chicago", "All", "Someday"),
            Err(BikeshareError::InvalidFilter { kind: "day", .. })
        ));
    }
}
