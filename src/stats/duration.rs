use std::time::{Duration, Instant};

use crate::record::RecordSet;
use crate::stats::utility::mean;

/// Total and average trip length, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationStats {
    pub total_seconds: f64,
    /// `None` when there are no trips to average.
    pub average_seconds: Option<f64>,
    pub elapsed: Duration,
}

pub fn trip_duration_stats(set: &RecordSet) -> DurationStats {
    let started = Instant::now();
    let durations: Vec<f64> = set.records().iter().map(|r| r.trip_duration).collect();

    DurationStats {
        total_seconds: durations.iter().fold(0.0, |acc, d| acc + d),
        average_seconds: mean(&durations),
        elapsed: started.elapsed(),
    }
}
