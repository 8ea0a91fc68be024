//! Result presentation.
//!
//! Turns the four statistic groups into an ordered [`ResultBundle`] that a
//! rendering layer can consume as-is, and formats that bundle as text or
//! JSON.

use std::sync::Arc;
use std::time::Duration;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{BikeshareError, Result};
use crate::filter::{day_name, month_name};
use crate::record::RecordSet;
use crate::stats::{
    DurationStats, GenderSplit, StationStats, TimeStats, UserStats, station_stats, time_stats,
    trip_duration_stats, user_stats,
};

pub const TIME_GROUP: &str = "Time Statistics";
pub const STATION_GROUP: &str = "Station Statistics";
pub const DURATION_GROUP: &str = "Trip Duration Statistics";
pub const USER_GROUP: &str = "User Statistics";

pub const TIME_TAKEN: &str = "Time Taken";

pub const NO_DATA: &str = "No data available for the selected filters";
pub const NO_GENDER_DATA: &str = "No Gender Data available for this City";
pub const NO_BIRTH_YEAR_DATA: &str = "No Birth Year Data available for this City";

/// A single displayable statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl DisplayValue {
    fn text_or(value: Option<impl Into<String>>, sentinel: &str) -> Self {
        match value {
            Some(v) => DisplayValue::Text(v.into()),
            None => DisplayValue::Text(sentinel.to_string()),
        }
    }

    fn integer_or(value: Option<impl Into<i64>>, sentinel: &str) -> Self {
        match value {
            Some(v) => DisplayValue::Integer(v.into()),
            None => DisplayValue::Text(sentinel.to_string()),
        }
    }
}

impl std::fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayValue::Text(s) => f.write_str(s),
            DisplayValue::Integer(i) => write!(f, "{i}"),
            DisplayValue::Number(n) => write!(f, "{n:.2}"),
        }
    }
}

/// One named cluster of statistics and the time it took to compute.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticGroup {
    pub name: &'static str,
    pub entries: Vec<(&'static str, DisplayValue)>,
    pub elapsed: Duration,
}

impl StatisticGroup {
    pub fn get(&self, label: &str) -> Option<&DisplayValue> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v)
    }
}

// Serialized as an ordered object of label -> value, ending with the timing.
impl Serialize for StatisticGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.serialize_entry(TIME_TAKEN, &self.elapsed.as_secs_f64())?;
        map.end()
    }
}

/// The four statistic groups, always in the order Time, Station, Duration,
/// User.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBundle {
    groups: Vec<StatisticGroup>,
}

impl ResultBundle {
    fn new(
        time: TimeStats,
        station: StationStats,
        duration: DurationStats,
        user: UserStats,
    ) -> Self {
        Self {
            groups: vec![
                time_group(time),
                station_group(station),
                duration_group(duration),
                user_group(user),
            ],
        }
    }

    pub fn groups(&self) -> &[StatisticGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&StatisticGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

impl Serialize for ResultBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(group.name, group)?;
        }
        map.end()
    }
}

/// Computes all four statistic groups sequentially.
#[tracing::instrument(skip_all, fields(city = %set.city(), records = set.len()))]
pub fn render(set: &RecordSet) -> ResultBundle {
    ResultBundle::new(
        time_stats(set),
        station_stats(set),
        trip_duration_stats(set),
        user_stats(set),
    )
}

/// Computes the four groups on blocking tasks over a shared record set.
///
/// Produces the same bundle as [`render`] apart from timings.
#[tracing::instrument(skip_all, fields(city = %set.city(), records = set.len()))]
pub async fn render_concurrent(set: Arc<RecordSet>) -> Result<ResultBundle> {
    let time = spawn_stat(&set, time_stats);
    let station = spawn_stat(&set, station_stats);
    let duration = spawn_stat(&set, trip_duration_stats);
    let user = spawn_stat(&set, user_stats);

    let (time, station, duration, user) = tokio::try_join!(time, station, duration, user)
        .map_err(|e| BikeshareError::TaskJoin(e.to_string()))?;

    Ok(ResultBundle::new(time, station, duration, user))
}

fn spawn_stat<T: Send + 'static>(
    set: &Arc<RecordSet>,
    stat: fn(&RecordSet) -> T,
) -> tokio::task::JoinHandle<T> {
    let set = Arc::clone(set);
    tokio::task::spawn_blocking(move || stat(&set))
}

fn time_group(s: TimeStats) -> StatisticGroup {
    StatisticGroup {
        name: TIME_GROUP,
        entries: vec![
            (
                "Most Common Month of Travel",
                DisplayValue::text_or(s.most_common_month.and_then(month_name), NO_DATA),
            ),
            (
                "Most Common Day of Travel",
                DisplayValue::text_or(s.most_common_day.and_then(day_name), NO_DATA),
            ),
            (
                "Most Common Hour of Travel",
                DisplayValue::integer_or(s.most_common_hour, NO_DATA),
            ),
        ],
        elapsed: s.elapsed,
    }
}

fn station_group(s: StationStats) -> StatisticGroup {
    StatisticGroup {
        name: STATION_GROUP,
        entries: vec![
            (
                "Most Common Starting Station",
                DisplayValue::text_or(s.most_common_start, NO_DATA),
            ),
            (
                "Most Common Ending Station",
                DisplayValue::text_or(s.most_common_end, NO_DATA),
            ),
            (
                "Most Common Start -> End Station Combination",
                DisplayValue::text_or(s.most_common_combination, NO_DATA),
            ),
        ],
        elapsed: s.elapsed,
    }
}

fn duration_group(s: DurationStats) -> StatisticGroup {
    let average = match s.average_seconds {
        Some(avg) => DisplayValue::Number(avg),
        None => DisplayValue::Text(NO_DATA.to_string()),
    };

    StatisticGroup {
        name: DURATION_GROUP,
        entries: vec![
            (
                "Total Time of Travel (in seconds)",
                DisplayValue::Number(s.total_seconds),
            ),
            ("Average Time of Travel per trip (in seconds)", average),
        ],
        elapsed: s.elapsed,
    }
}

fn user_group(s: UserStats) -> StatisticGroup {
    let gender = match &s.gender_split {
        GenderSplit::NotRecorded => NO_GENDER_DATA.to_string(),
        GenderSplit::Counts(counts) if counts.is_empty() => NO_DATA.to_string(),
        GenderSplit::Counts(counts) => counts
            .iter()
            .map(|(g, n)| format!("{}: {}", g.label(), n))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    let years = s.birth_years;
    StatisticGroup {
        name: USER_GROUP,
        entries: vec![
            ("Gender Split", DisplayValue::Text(gender)),
            (
                "Minimum Year of Birth",
                DisplayValue::integer_or(years.map(|y| y.earliest), NO_BIRTH_YEAR_DATA),
            ),
            (
                "Most Recent Year of Birth",
                DisplayValue::integer_or(years.map(|y| y.most_recent), NO_BIRTH_YEAR_DATA),
            ),
            (
                "Most Common Year of Birth",
                DisplayValue::integer_or(years.map(|y| y.most_common), NO_BIRTH_YEAR_DATA),
            ),
        ],
        elapsed: s.elapsed,
    }
}

/// Logs the bundle using Rust's debug pretty-print format.
pub fn print_pretty(bundle: &ResultBundle) {
    debug!("{:#?}", bundle);
}

/// Serializes the bundle as pretty-printed JSON.
pub fn to_json(bundle: &ResultBundle) -> Result<String> {
    Ok(serde_json::to_string_pretty(bundle)?)
}

/// Plain-text report, one indented line per statistic.
pub fn to_text(bundle: &ResultBundle) -> String {
    let mut out = String::new();
    for group in bundle.groups() {
        out.push_str(&format!("{}\n", group.name));
        for (label, value) in &group.entries {
            let value = value.to_string().replace('\n', "\n    ");
            out.push_str(&format!("  {label}: {value}\n"));
        }
        out.push_str(&format!(
            "  {TIME_TAKEN}: {:.6}s\n\n",
            group.elapsed.as_secs_f64()
        ));
    }
    out
}
