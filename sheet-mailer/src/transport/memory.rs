//! In-memory transport
//!
//! Records every message instead of delivering it. Backs the `--dry-run`
//! flag and lets tests inspect exactly what would have been sent.

use crate::error::{MailerError, Result};
use crate::transport::{EmailTransport, OutgoingMessage, TransportReceipt};
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::debug;

/// Transport that keeps sent messages in memory
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutgoingMessage>>,
    calls: Mutex<usize>,
    fail_on: HashSet<usize>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the given calls (0-based, counted across all `send` calls)
    pub fn failing_on<I: IntoIterator<Item = usize>>(calls: I) -> Self {
        Self {
            fail_on: calls.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Messages accepted so far, in send order
    pub async fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().await.clone()
    }

    /// Number of `send` calls, accepted or rejected
    pub async fn call_count(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait::async_trait]
impl EmailTransport for RecordingTransport {
    async fn send(&self, message: OutgoingMessage) -> Result<TransportReceipt> {
        let call = {
            let mut calls = self.calls.lock().await;
            let call = *calls;
            *calls += 1;
            call
        };

        if self.fail_on.contains(&call) {
            return Err(MailerError::Transport(format!(
                "recipient {} rejected",
                message.to
            )));
        }

        debug!("Recorded message to {} ({} bytes)", message.to, message.html.len());
        self.sent.lock().await.push(message);

        Ok(TransportReceipt {
            response: format!("250 recorded #{}", call),
        })
    }
}
