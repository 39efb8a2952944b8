//! Sending, the scheduled sweep trigger and the provider webhook.

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Json;
use axum::Form;
use chrono::{DateTime, Utc};
use inbox_core::{Channel, Message};
use inbox_engine::{require_sender, IngestOutcome, SendRequest, SweepReport, WebhookPayload};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::identity::CurrentUser;
use crate::state::AppState;

/// Wire form of a send request. Fields are optional here so absence is a 400, not a parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBody {
    pub thread_id: Option<String>,
    pub channel: Option<String>,
    pub content: Option<String>,
    pub to: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl SendBody {
    fn into_request(self) -> Result<SendRequest, ApiError> {
        let (Some(thread_id), Some(channel), Some(content), Some(to)) =
            (self.thread_id, self.channel, self.content, self.to)
        else {
            return Err(ApiError::bad_request("Missing required fields"));
        };
        let channel: Channel = channel
            .trim()
            .parse()
            .map_err(|_| ApiError::bad_request(format!("Unsupported channel: {}", channel)))?;
        Ok(SendRequest {
            thread_id,
            channel,
            content,
            to,
            scheduled_at: self.scheduled_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: Message,
}

pub async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<SendBody>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Role is checked before the body so viewers always see 403.
    require_sender(&user)?;
    let Json(body) = body?;
    let request = body.into_request()?;
    let message = state.dispatch.dispatch(request, &user).await?;
    Ok(Json(MessageResponse { message }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Sweep trigger for an external scheduler. Without a configured secret nothing is accepted.
pub async fn process_scheduled(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SweepReport>, ApiError> {
    let authorized = match (state.cron_secret.as_deref(), bearer_token(&headers)) {
        (Some(secret), Some(presented)) => secret == presented,
        _ => false,
    };
    if !authorized {
        warn!("Sweep trigger rejected");
        return Err(ApiError::unauthorized());
    }

    let report = state.sweeper.sweep(Utc::now()).await?;
    info!(
        processed = report.processed,
        succeeded = report.succeeded,
        failed = report.failed,
        "Sweep triggered"
    );
    Ok(Json(report))
}

/// Provider callback. 200 with an empty body once stored; 500 so the provider redelivers otherwise.
pub async fn twilio_webhook(
    State(state): State<AppState>,
    payload: Result<Form<WebhookPayload>, FormRejection>,
) -> Result<StatusCode, ApiError> {
    let Form(payload) = payload?;
    match state.ingestor.ingest(payload).await? {
        IngestOutcome::Created { message, .. } => {
            info!(message_id = %message.id, "Webhook processed")
        }
        other => debug!(outcome = ?other, "Webhook acknowledged"),
    }
    Ok(StatusCode::OK)
}
