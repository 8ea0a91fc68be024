use std::time::{Duration, Instant};

use crate::record::RecordSet;
use crate::stats::utility::mode;

/// Separator between start and end station in a trip combination.
pub const COMBINATION_SEPARATOR: &str = " -> ";

/// Most popular stations and trip.
#[derive(Debug, Clone, PartialEq)]
pub struct StationStats {
    pub most_common_start: Option<String>,
    pub most_common_end: Option<String>,
    /// `"<start> -> <end>"`.
    pub most_common_combination: Option<String>,
    pub elapsed: Duration,
}

pub fn station_stats(set: &RecordSet) -> StationStats {
    let started = Instant::now();
    let records = set.records();

    let most_common_start = mode(records.iter().map(|r| r.start_station.as_str()));
    let most_common_end = mode(records.iter().map(|r| r.end_station.as_str()));
    let most_common_combination = mode(records.iter().map(|r| {
        format!(
            "{}{}{}",
            r.start_station, COMBINATION_SEPARATOR, r.end_station
        )
    }));

    StationStats {
        most_common_start: most_common_start.map(str::to_string),
        most_common_end: most_common_end.map(str::to_string),
        most_common_combination,
        elapsed: started.elapsed(),
    }
}
