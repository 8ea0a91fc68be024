use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::record::{Gender, RecordSet};
use crate::stats::utility::mode;

/// Per-gender trip counts, or the absence of the column in this city's data.
#[derive(Debug, Clone, PartialEq)]
pub enum GenderSplit {
    NotRecorded,
    /// Sorted by label, ascending.
    Counts(Vec<(Gender, usize)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthYears {
    pub earliest: i32,
    pub most_recent: i32,
    pub most_common: i32,
}

/// Who rides: gender split and birth-year summary.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub gender_split: GenderSplit,
    /// `None` when the city has no birth years or none survive the filters.
    pub birth_years: Option<BirthYears>,
    pub elapsed: Duration,
}

pub fn user_stats(set: &RecordSet) -> UserStats {
    let started = Instant::now();

    let gender_split = if set.has_gender() {
        let mut counts: BTreeMap<&'static str, (Gender, usize)> = BTreeMap::new();
        for gender in set.records().iter().filter_map(|r| r.gender) {
            counts.entry(gender.label()).or_insert((gender, 0)).1 += 1;
        }
        GenderSplit::Counts(counts.into_values().collect())
    } else {
        GenderSplit::NotRecorded
    };

    let birth_years = if set.has_birth_year() {
        summarize_birth_years(set.records().iter().filter_map(|r| r.birth_year))
    } else {
        None
    };

    UserStats {
        gender_split,
        birth_years,
        elapsed: started.elapsed(),
    }
}

fn summarize_birth_years(years: impl Iterator<Item = i32> + Clone) -> Option<BirthYears> {
    Some(BirthYears {
        earliest: years.clone().min()?,
        most_recent: years.clone().max()?,
        most_common: mode(years)?,
    })
}
