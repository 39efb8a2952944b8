//! Analytics time windows.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Selectable reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
    AllTime,
}

impl TimeRange {
    /// Parses the `range` selector (`7`, `30`, `90`, `all`). Anything else means 30 days.
    pub fn parse(selector: Option<&str>) -> Self {
        match selector.map(str::trim) {
            Some("7") => TimeRange::Last7Days,
            Some("30") => TimeRange::Last30Days,
            Some("90") => TimeRange::Last90Days,
            Some("all") => TimeRange::AllTime,
            _ => TimeRange::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Last7Days => "7",
            TimeRange::Last30Days => "30",
            TimeRange::Last90Days => "90",
            TimeRange::AllTime => "all",
        }
    }

    /// Inclusive lower bound of the window ending at `now`. All-time starts at the Unix epoch.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeRange::Last7Days => now - Duration::days(7),
            TimeRange::Last30Days => now - Duration::days(30),
            TimeRange::Last90Days => now - Duration::days(90),
            TimeRange::AllTime => Utc.timestamp_opt(0, 0).single().unwrap_or(now),
        }
    }
}
