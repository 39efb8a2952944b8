//! Scheduled delivery sweeper: sends SCHEDULED messages whose time has come.
//!
//! Each due message is claimed (SCHEDULED -> PENDING) before the transport call, so overlapping
//! sweeps never send the same message twice. One message's failure never aborts the sweep.
//! A claim still PENDING after [`CLAIM_LEASE_SECS`] belonged to a sweep that died mid-send; the
//! next sweep marks it FAILED rather than risk a second delivery.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use inbox_core::Message;
use serde::{Deserialize, Serialize};
use storage::Store;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::route::OutboundRoute;

/// Maximum number of messages sent per sweep.
pub const SWEEP_BATCH_LIMIT: i64 = 50;

/// How long a claimed message may stay PENDING before it counts as abandoned.
pub const CLAIM_LEASE_SECS: i64 = 300;

/// Outcome counts of one sweep. `processed == succeeded + failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

enum Delivery {
    Sent,
    Failed,
    Lost,
}

#[derive(Clone)]
pub struct ScheduledSweeper {
    store: Store,
    route: OutboundRoute,
}

impl ScheduledSweeper {
    pub fn new(store: Store, route: OutboundRoute) -> Self {
        Self { store, route }
    }

    /// Sends every message due at `now`, up to [`SWEEP_BATCH_LIMIT`].
    ///
    /// Messages another sweeper claimed first are skipped and not counted.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        self.store
            .messages
            .fail_stale_claims(now - ChronoDuration::seconds(CLAIM_LEASE_SECS))
            .await?;

        let due = self
            .store
            .messages
            .find_due_scheduled(now, SWEEP_BATCH_LIMIT)
            .await?;
        info!(due = due.len(), "step: sweep started");

        let mut report = SweepReport::default();
        for message in due {
            match self.deliver(&message, now).await {
                Ok(Delivery::Sent) => {
                    report.processed += 1;
                    report.succeeded += 1;
                }
                Ok(Delivery::Failed) => {
                    report.processed += 1;
                    report.failed += 1;
                }
                Ok(Delivery::Lost) => {}
                Err(e) => {
                    error!(message_id = %message.id, error = %e, "Sweep failed to finalise message");
                    report.processed += 1;
                    report.failed += 1;
                }
            }
        }

        info!(
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            "step: sweep finished"
        );
        Ok(report)
    }

    async fn deliver(&self, message: &Message, now: DateTime<Utc>) -> Result<Delivery> {
        if !self.store.messages.claim_scheduled(&message.id, now).await? {
            info!(message_id = %message.id, "Scheduled message already claimed; skipping");
            return Ok(Delivery::Lost);
        }

        match self
            .route
            .send(message.channel, &message.to_address, &message.content)
            .await
        {
            Ok(receipt) => {
                self.store
                    .messages
                    .complete_sent(message, &receipt.external_id, now)
                    .await?;
                info!(
                    message_id = %message.id,
                    external_id = %receipt.external_id,
                    "step: scheduled message sent"
                );
                Ok(Delivery::Sent)
            }
            Err(e) => {
                warn!(message_id = %message.id, channel = %message.channel, error = %e, "Scheduled send failed");
                self.store.messages.mark_failed(&message.id).await?;
                Ok(Delivery::Failed)
            }
        }
    }

    /// Runs [`ScheduledSweeper::sweep`] every `every` until the handle is aborted.
    pub fn spawn_periodic(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        info!(interval = ?every, "Starting in-process sweeper");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep(Utc::now()).await {
                    error!(error = %e, "Periodic sweep failed");
                }
            }
        })
    }
}
