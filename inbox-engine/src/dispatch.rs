//! Message dispatch: turns a send intent into a persisted message and, unless deferred, a transport call.
//!
//! Paths:
//! - `scheduled_at` strictly in the future: SCHEDULED message, no transport call, thread touched.
//! - transport success: SENT message with provider id and `sent_at`, thread touched in the same transaction.
//! - transport failure: FAILED message persisted, thread untouched, error surfaced as `DispatchFailed`.

use chrono::{DateTime, Utc};
use inbox_core::{Channel, Message, MessageStatus, User};
use serde::{Deserialize, Serialize};
use storage::{NewMessage, Store};
use tracing::{error, info, instrument, warn};

use crate::access::require_sender;
use crate::error::{EngineError, Result};
use crate::route::OutboundRoute;

/// A user's request to send (or schedule) a message on a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub thread_id: String,
    pub channel: Channel,
    pub content: String,
    pub to: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl SendRequest {
    fn validate(&self) -> Result<()> {
        if self.thread_id.trim().is_empty()
            || self.content.trim().is_empty()
            || self.to.trim().is_empty()
        {
            return Err(EngineError::Validation("Missing required fields".to_string()));
        }
        if !self.channel.is_dispatchable() {
            return Err(EngineError::UnsupportedChannel(self.channel));
        }
        Ok(())
    }

    /// Deferred only when the schedule time is strictly after `now`.
    fn defer_until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.scheduled_at.filter(|at| *at > now)
    }
}

#[derive(Clone)]
pub struct DispatchEngine {
    store: Store,
    route: OutboundRoute,
}

impl DispatchEngine {
    pub fn new(store: Store, route: OutboundRoute) -> Self {
        Self { store, route }
    }

    /// Dispatches at the current time. See [`DispatchEngine::dispatch_at`].
    pub async fn dispatch(&self, request: SendRequest, acting_user: &User) -> Result<Message> {
        self.dispatch_at(request, acting_user, Utc::now()).await
    }

    /// Dispatches with an explicit clock.
    ///
    /// Role, field and channel checks run before anything is written; a rejected request leaves
    /// no message and no thread change behind.
    #[instrument(skip(self, request, acting_user), fields(thread_id = %request.thread_id, channel = %request.channel, user_id = %acting_user.id))]
    pub async fn dispatch_at(
        &self,
        request: SendRequest,
        acting_user: &User,
        now: DateTime<Utc>,
    ) -> Result<Message> {
        require_sender(acting_user)?;
        request.validate()?;

        if self.store.threads.find_by_id(&request.thread_id).await?.is_none() {
            return Err(EngineError::NotFound("Thread not found".to_string()));
        }

        let from = self.route.from_address(request.channel);

        if let Some(at) = request.defer_until(now) {
            let pending = NewMessage::outbound(
                &request.thread_id,
                &acting_user.id,
                request.channel,
                &request.content,
                &from,
                &request.to,
                MessageStatus::Scheduled,
            )
            .created_at(now)
            .scheduled_for(at);

            let message = self.store.messages.insert_and_touch_thread(&pending, now).await?;
            info!(message_id = %message.id, scheduled_at = %at, "step: message scheduled");
            return Ok(message);
        }

        info!("step: dispatching immediately");
        match self
            .route
            .send(request.channel, &request.to, &request.content)
            .await
        {
            Ok(receipt) => {
                let sent = NewMessage::outbound(
                    &request.thread_id,
                    &acting_user.id,
                    request.channel,
                    &request.content,
                    &from,
                    &request.to,
                    MessageStatus::Sent,
                )
                .created_at(now)
                .sent(Some(receipt.external_id), now);

                let message = self.store.messages.insert_and_touch_thread(&sent, now).await?;
                info!(
                    message_id = %message.id,
                    external_id = ?message.external_id,
                    "step: message sent"
                );
                Ok(message)
            }
            Err(source) => {
                warn!(error = %source, "Transport failed; recording FAILED message");
                let failed = NewMessage::outbound(
                    &request.thread_id,
                    &acting_user.id,
                    request.channel,
                    &request.content,
                    &from,
                    &request.to,
                    MessageStatus::Failed,
                )
                .created_at(now);

                let message = self.store.messages.insert(&failed).await.map_err(|e| {
                    error!(error = %e, transport_error = %source, "Failed to record FAILED message");
                    e
                })?;
                Err(EngineError::DispatchFailed {
                    message: Box::new(message),
                    source,
                })
            }
        }
    }
}
