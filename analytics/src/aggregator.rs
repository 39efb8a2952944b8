//! Repository-backed analytics: fetches the window and hands it to [`compute_report`].

use chrono::{DateTime, Local, Utc};
use storage::Store;
use tracing::info;

use crate::error::Result;
use crate::range::TimeRange;
use crate::report::{compute_report, AnalyticsReport};

#[derive(Clone)]
pub struct AnalyticsAggregator {
    store: Store,
}

impl AnalyticsAggregator {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Report over messages created in `[window_start, now]`. Hours are bucketed in server local time.
    pub async fn aggregate(
        &self,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsReport> {
        let messages = self
            .store
            .messages
            .list_created_between(window_start, now)
            .await?;
        let report = compute_report(&messages, &Local);
        info!(
            window_start = %window_start,
            total_messages = report.overview.total_messages,
            "step: analytics computed"
        );
        Ok(report)
    }

    pub async fn report(&self, range: TimeRange) -> Result<AnalyticsReport> {
        let now = Utc::now();
        self.aggregate(range.window_start(now), now).await
    }
}
