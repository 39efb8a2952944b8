//! Webhook ingestion: folds provider callbacks into contacts, threads and messages.
//!
//! A callback is one of:
//! - a new inbound message (contact and thread are found or created, unread count bumped);
//! - a redelivery of an inbound message already stored (acknowledged, nothing changes);
//! - a delivery receipt for one of our outbound messages (status advanced forward only).

use chrono::{DateTime, Utc};
use inbox_core::{
    has_whatsapp_prefix, strip_whatsapp_prefix, Channel, Direction, Message, MessageStatus,
};
use serde::{Deserialize, Serialize};
use storage::{NewMessage, Store};
use tracing::{info, instrument, warn};

use crate::error::IngestError;

/// Provider form payload. Every field is optional on the wire; required ones are checked in `ingest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "MessageSid")]
    pub message_sid: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "To")]
    pub to: Option<String>,
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "MessageStatus")]
    pub message_status: Option<String>,
    #[serde(rename = "NumMedia")]
    pub num_media: Option<String>,
}

impl WebhookPayload {
    fn media_count(&self) -> u32 {
        self.num_media
            .as_deref()
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Strips the WhatsApp marker and guarantees exactly one leading `+`.
pub fn normalize_phone(address: &str) -> String {
    let bare = strip_whatsapp_prefix(address.trim());
    format!("+{}", bare.trim_start_matches('+'))
}

/// WHATSAPP when either side carries the marker, SMS otherwise.
pub fn classify_channel(from: &str, to: &str) -> Channel {
    if has_whatsapp_prefix(from) || has_whatsapp_prefix(to) {
        Channel::Whatsapp
    } else {
        Channel::Sms
    }
}

/// What an ingestion did.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Created {
        message: Message,
        contact_created: bool,
        thread_created: bool,
    },
    StatusUpdated {
        message_id: String,
        status: MessageStatus,
    },
    /// Receipt for an outbound message that would move its status backwards (or nowhere).
    StatusIgnored {
        message_id: String,
        current: MessageStatus,
        reported: MessageStatus,
    },
    Duplicate {
        message_id: String,
    },
}

#[derive(Clone)]
pub struct WebhookIngestor {
    store: Store,
}

impl WebhookIngestor {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn ingest(&self, payload: WebhookPayload) -> Result<IngestOutcome, IngestError> {
        self.ingest_at(payload, Utc::now()).await
    }

    #[instrument(skip(self, payload, now), fields(external_id = ?payload.message_sid))]
    pub async fn ingest_at(
        &self,
        payload: WebhookPayload,
        now: DateTime<Utc>,
    ) -> Result<IngestOutcome, IngestError> {
        let external_id = required(&payload.message_sid, "MessageSid")?;
        let from = required(&payload.from, "From")?;
        let to = payload.to.clone().unwrap_or_default();
        let body = payload.body.clone().unwrap_or_default();
        let reported = MessageStatus::from_provider(payload.message_status.as_deref().unwrap_or(""));

        info!(
            from = %from,
            to = %to,
            body = %truncate(&body, 50),
            message_status = ?payload.message_status,
            num_media = payload.media_count(),
            "step: webhook received"
        );

        if let Some(existing) = self.store.messages.find_by_external_id(&external_id).await? {
            return self.fold_into_existing(existing, reported).await;
        }

        let channel = classify_channel(&from, &to);
        let phone = normalize_phone(&from);

        let (contact, contact_created) = self
            .store
            .contacts
            .get_or_create_by_phone(&phone, now)
            .await?;
        let (thread, thread_created) = self
            .store
            .threads
            .get_or_create_for_contact(&contact.id, now)
            .await?;

        let inbound = NewMessage::inbound(
            &thread.id,
            channel,
            reported,
            &body,
            &from,
            &to,
            &external_id,
        )
        .created_at(now)
        .sent(None, now);

        match self.store.messages.insert_inbound(&inbound, now).await? {
            Some(message) => {
                info!(
                    message_id = %message.id,
                    thread_id = %thread.id,
                    contact_id = %contact.id,
                    channel = %channel,
                    "step: inbound message stored"
                );
                Ok(IngestOutcome::Created {
                    message,
                    contact_created,
                    thread_created,
                })
            }
            // Lost a race with a concurrent redelivery of the same message.
            None => match self.store.messages.find_by_external_id(&external_id).await? {
                Some(existing) => Ok(IngestOutcome::Duplicate {
                    message_id: existing.id,
                }),
                None => Err(IngestError::Malformed(format!(
                    "message {} vanished during ingestion",
                    external_id
                ))),
            },
        }
    }

    async fn fold_into_existing(
        &self,
        existing: Message,
        reported: MessageStatus,
    ) -> Result<IngestOutcome, IngestError> {
        if existing.direction == Direction::Inbound {
            info!(message_id = %existing.id, "Duplicate inbound webhook acknowledged");
            return Ok(IngestOutcome::Duplicate {
                message_id: existing.id,
            });
        }

        if !existing.status.can_advance_to(reported) {
            info!(
                message_id = %existing.id,
                current = %existing.status,
                reported = %reported,
                "Status callback ignored"
            );
            return Ok(IngestOutcome::StatusIgnored {
                message_id: existing.id,
                current: existing.status,
                reported,
            });
        }

        let applied = self
            .store
            .messages
            .transition_status(&existing.id, existing.status, reported)
            .await?;
        if !applied {
            warn!(message_id = %existing.id, "Status changed concurrently; callback ignored");
            return Ok(IngestOutcome::StatusIgnored {
                message_id: existing.id,
                current: existing.status,
                reported,
            });
        }

        info!(message_id = %existing.id, status = %reported, "step: delivery status updated");
        Ok(IngestOutcome::StatusUpdated {
            message_id: existing.id,
            status: reported,
        })
    }
}

fn required(field: &Option<String>, name: &str) -> Result<String, IngestError> {
    match field.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(IngestError::Malformed(format!("missing {}", name))),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
