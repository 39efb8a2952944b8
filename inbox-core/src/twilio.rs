//! Twilio REST implementation of [`MessagingTransport`].
//!
//! Sends via `POST {base}/2010-04-01/Accounts/{sid}/Messages.json` with basic auth and form fields
//! `To`, `From`, `Body`. The HTTP client carries a bounded timeout; a timeout is a transport failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{TransportError, TransportResult};
use crate::transport::{
    strip_whatsapp_prefix, with_whatsapp_prefix, MessagingTransport, OutboundRequest,
    TransportReceipt,
};
use crate::types::Channel;

pub const DEFAULT_TWILIO_API_URL: &str = "https://api.twilio.com";

/// Masks a secret for safe logging: first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of it.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_ascii() {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

/// Credentials and endpoint for the Twilio API.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub api_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Twilio-backed transport.
#[derive(Clone)]
pub struct TwilioTransport {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioTransport {
    pub fn new(config: TwilioConfig) -> TransportResult<Self> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(TransportError::NotConfigured(
                "Twilio credentials are missing".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        info!(
            account_sid = %config.account_sid,
            auth_token = %mask_token(&config.auth_token),
            api_url = %config.api_url,
            timeout_secs = config.timeout.as_secs(),
            "Twilio transport initialised"
        );

        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Provider-level addressing: WhatsApp sends carry the marker on both ends.
    fn addresses(request: &OutboundRequest) -> TransportResult<(String, String)> {
        match request.channel {
            Channel::Sms => {
                if request.from.trim().is_empty() {
                    return Err(TransportError::NotConfigured(
                        "Twilio phone number is not configured".to_string(),
                    ));
                }
                Ok((request.from.clone(), request.to.clone()))
            }
            Channel::Whatsapp => {
                if strip_whatsapp_prefix(&request.from).trim().is_empty() {
                    return Err(TransportError::NotConfigured(
                        "Twilio WhatsApp number is not configured".to_string(),
                    ));
                }
                Ok((
                    with_whatsapp_prefix(&request.from),
                    with_whatsapp_prefix(&request.to),
                ))
            }
            other => Err(TransportError::UnsupportedChannel(other)),
        }
    }
}

#[async_trait]
impl MessagingTransport for TwilioTransport {
    async fn send(&self, request: &OutboundRequest) -> TransportResult<TransportReceipt> {
        let (from, to) = Self::addresses(request)?;

        info!(
            channel = %request.channel,
            to = %to,
            body_len = request.body.len(),
            "step: Twilio send request"
        );

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", to.as_str()), ("From", from.as_str()), ("Body", request.body.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.config.timeout)
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TwilioErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            warn!(http_status = status.as_u16(), error = %message, "Twilio rejected message");
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TwilioMessageResponse = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        info!(sid = %parsed.sid, status = ?parsed.status, "step: Twilio send accepted");

        Ok(TransportReceipt {
            external_id: parsed.sid,
            status: parsed.status.unwrap_or_else(|| "queued".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token_short() {
        assert_eq!(mask_token(""), "***");
        assert_eq!(mask_token("abcdefghijk"), "***");
    }

    #[test]
    fn test_mask_token_long() {
        assert_eq!(mask_token("abcdefghijklmnop"), "abcdefg***mnop");
    }

    #[test]
    fn test_new_requires_credentials() {
        let result = TwilioTransport::new(TwilioConfig {
            account_sid: String::new(),
            auth_token: "token".to_string(),
            api_url: DEFAULT_TWILIO_API_URL.to_string(),
            timeout: Duration::from_secs(5),
        });
        assert!(matches!(result, Err(TransportError::NotConfigured(_))));
    }

    #[test]
    fn test_addresses_rejects_email() {
        let request = OutboundRequest {
            channel: Channel::Email,
            from: "+1".to_string(),
            to: "a@b.c".to_string(),
            body: "hi".to_string(),
        };
        assert!(matches!(
            TwilioTransport::addresses(&request),
            Err(TransportError::UnsupportedChannel(Channel::Email))
        ));
    }
}
