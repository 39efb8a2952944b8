//! Server config, loaded from env.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use inbox_core::{mask_token, SenderNumbers, TwilioConfig, DEFAULT_TWILIO_API_URL};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://./inbox.db";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// DATABASE_URL
    pub database_url: String,
    /// BIND_ADDR
    pub bind_addr: String,
    /// LOG_FILE
    pub log_file: String,
    /// TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_API_URL
    pub twilio: TwilioConfig,
    /// TWILIO_PHONE_NUMBER, TWILIO_WHATSAPP_NUMBER
    pub senders: SenderNumbers,
    /// TRANSPORT_TIMEOUT_SECS; bounds each provider call
    pub transport_timeout: Duration,
    /// CRON_SECRET; the sweep endpoint rejects every call when unset
    pub cron_secret: Option<String>,
    /// SWEEP_INTERVAL_SECS; runs the sweeper in-process when set
    pub sweep_interval: Option<Duration>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// DATABASE_URL alone, for commands that only read the store.
pub fn database_url_from_env() -> String {
    var_or("DATABASE_URL", DEFAULT_DATABASE_URL)
}

impl ServerConfig {
    /// Load from environment variables. Twilio credentials are required.
    pub fn load() -> Result<Self> {
        let account_sid = env::var("TWILIO_ACCOUNT_SID").context("TWILIO_ACCOUNT_SID not set")?;
        let auth_token = env::var("TWILIO_AUTH_TOKEN").context("TWILIO_AUTH_TOKEN not set")?;

        let transport_timeout_secs: u64 = match optional_var("TRANSPORT_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("TRANSPORT_TIMEOUT_SECS is not a number: {}", v))?,
            None => 15,
        };
        let sweep_interval = match optional_var("SWEEP_INTERVAL_SECS") {
            Some(v) => Some(Duration::from_secs(
                v.trim()
                    .parse()
                    .with_context(|| format!("SWEEP_INTERVAL_SECS is not a number: {}", v))?,
            )),
            None => None,
        };
        let transport_timeout = Duration::from_secs(transport_timeout_secs);

        let config = Self {
            database_url: database_url_from_env(),
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            log_file: var_or("LOG_FILE", "logs/inbox.log"),
            twilio: TwilioConfig {
                account_sid,
                auth_token,
                api_url: var_or("TWILIO_API_URL", DEFAULT_TWILIO_API_URL),
                timeout: transport_timeout,
            },
            senders: SenderNumbers::new(
                var_or("TWILIO_PHONE_NUMBER", ""),
                optional_var("TWILIO_WHATSAPP_NUMBER"),
            ),
            transport_timeout,
            cron_secret: optional_var("CRON_SECRET"),
            sweep_interval,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate config (credentials non-empty, API URL parses, intervals non-zero).
    pub fn validate(&self) -> Result<()> {
        if self.twilio.account_sid.trim().is_empty() || self.twilio.auth_token.trim().is_empty() {
            bail!("TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN must not be empty");
        }
        if reqwest::Url::parse(&self.twilio.api_url).is_err() {
            bail!("TWILIO_API_URL is not a valid URL: {}", self.twilio.api_url);
        }
        if self.transport_timeout.is_zero() {
            bail!("TRANSPORT_TIMEOUT_SECS must be greater than zero");
        }
        if self.sweep_interval.is_some_and(|d| d.is_zero()) {
            bail!("SWEEP_INTERVAL_SECS must be greater than zero");
        }
        Ok(())
    }

    /// One-line summary with secrets masked.
    pub fn describe(&self) -> String {
        format!(
            "database_url={} bind_addr={} twilio_sid={} twilio_token={} sms_from={} cron_secret={} sweep_interval={:?}",
            self.database_url,
            self.bind_addr,
            self.twilio.account_sid,
            mask_token(&self.twilio.auth_token),
            self.senders.sms,
            self.cron_secret.as_deref().map(mask_token).unwrap_or_else(|| "<unset>".to_string()),
            self.sweep_interval,
        )
    }
}
