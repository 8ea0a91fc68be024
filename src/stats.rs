//! Summary statistics over a [`RecordSet`](crate::record::RecordSet).
//!
//! The four groups are independent pure functions of the same immutable
//! input, so they can run in any order or in parallel. Each one times
//! itself. An empty record set never fails: fields that cannot be computed
//! come back as `None`.

pub mod duration;
pub mod station;
pub mod time;
pub mod user;
pub mod utility;

pub use duration::{DurationStats, trip_duration_stats};
pub use station::{COMBINATION_SEPARATOR, StationStats, station_stats};
pub use time::{TimeStats, time_stats};
pub use user::{BirthYears, GenderSplit, UserStats, user_stats};
