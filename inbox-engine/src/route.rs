//! Channel routing to the messaging transport, shared by immediate dispatch and the sweeper.

use std::sync::Arc;
use std::time::Duration;

use inbox_core::{
    Channel, MessagingTransport, OutboundRequest, SenderNumbers, TransportError, TransportReceipt,
};
use tracing::warn;

/// Upper bound on one transport call when the caller does not choose one.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport plus sender numbers plus a bounded timeout.
#[derive(Clone)]
pub struct OutboundRoute {
    transport: Arc<dyn MessagingTransport>,
    senders: SenderNumbers,
    timeout: Duration,
}

impl OutboundRoute {
    pub fn new(transport: Arc<dyn MessagingTransport>, senders: SenderNumbers) -> Self {
        Self {
            transport,
            senders,
            timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The address recorded as `from` on messages sent over `channel`.
    pub fn from_address(&self, channel: Channel) -> String {
        self.senders.from_address(channel)
    }

    /// Sends over the transport. Unsupported channels and timeouts are transport failures.
    pub async fn send(
        &self,
        channel: Channel,
        to: &str,
        body: &str,
    ) -> Result<TransportReceipt, TransportError> {
        if !channel.is_dispatchable() {
            return Err(TransportError::UnsupportedChannel(channel));
        }
        let request = OutboundRequest {
            channel,
            from: self.from_address(channel),
            to: to.to_string(),
            body: body.to_string(),
        };
        match tokio::time::timeout(self.timeout, self.transport.send(&request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(channel = %channel, to = %to, timeout = ?self.timeout, "Transport call timed out");
                Err(TransportError::Timeout(self.timeout))
            }
        }
    }
}
