//! # analytics
//!
//! Message analytics for the inbox dashboard: an overview (volume, conversations, response time,
//! success rate) and chart-ready series, recomputed from the message log on every call.
//!
//! - [`compute_report`] – pure computation over a slice of messages
//! - [`AnalyticsAggregator`] – fetches a window from [`storage::Store`] and computes the report
//! - [`TimeRange`] – the `7` / `30` / `90` / `all` selector

pub mod aggregator;
pub mod error;
pub mod range;
pub mod report;


pub use aggregator::AnalyticsAggregator;
pub use error::{AnalyticsError, Result};
pub use range::TimeRange;
pub use report::{
    compute_report, round1, AnalyticsReport, ChannelCount, ChannelDirectionCount, Charts,
    DailyCount, DailyResponseTime, HourlyCount, Overview, StatusCount, UserCount, TOP_USERS,
};
