use std::time::{Duration, Instant};

use crate::record::RecordSet;
use crate::stats::utility::mode;

/// When people travel: the most common month, weekday and start hour.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeStats {
    /// January = 1.
    pub most_common_month: Option<u32>,
    /// Monday = 0.
    pub most_common_day: Option<u32>,
    pub most_common_hour: Option<u32>,
    pub elapsed: Duration,
}

pub fn time_stats(set: &RecordSet) -> TimeStats {
    let started = Instant::now();
    let records = set.records();

    TimeStats {
        most_common_month: mode(records.iter().map(|r| r.month)),
        most_common_day: mode(records.iter().map(|r| r.day_of_week)),
        most_common_hour: mode(records.iter().map(|r| r.hour())),
        elapsed: started.elapsed(),
    }
}
