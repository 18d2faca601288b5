//! Outbound items and the helper's per-message transmit verdicts.

use std::fmt;

use serde::Deserialize;

use crate::error::GatewayError;

/// Per-message verdict returned by the helper's `send` command.
///
/// `index` is the 1-based position of the message within the submitted batch;
/// any `result` other than `"success"` counts as a failed attempt.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TransmitOutcome {
    /// 1-based position within the submitted batch.
    pub index: usize,
    /// Helper verdict string.
    pub result: String,
}

impl TransmitOutcome {
    /// Whether the helper reported the message as sent.
    #[must_use]
    pub fn is_success(&self) -> bool { self.result == "success" }
}

/// Completion callback attached to a single outbound message.
///
/// Invoked exactly once: with the helper's verdict when the message is sent,
/// or with the final error once retries are exhausted.
pub type SendCallback =
    Box<dyn FnOnce(Result<&TransmitOutcome, &GatewayError>) + Send + 'static>;

/// A queued outbound message.
///
/// Items wait in the outbound queue in submission order. A failed attempt
/// bumps `attempts` and leaves the item in its original queue position until
/// the configured attempt limit removes it.
pub struct Outbound {
    to: String,
    content: String,
    attempts: u32,
    callback: Option<SendCallback>,
}

impl Outbound {
    /// Queue entry for `content` addressed to `to`.
    #[must_use]
    pub fn new(to: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            content: content.into(),
            attempts: 0,
            callback: None,
        }
    }

    /// Attach a completion callback to this item.
    #[must_use]
    pub fn with_callback(mut self, callback: SendCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Destination address.
    #[must_use]
    pub fn to(&self) -> &str { &self.to }

    /// Message body.
    #[must_use]
    pub fn content(&self) -> &str { &self.content }

    /// Number of transmit attempts made so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 { self.attempts }

    pub(crate) fn record_attempt(&mut self) { self.attempts += 1; }

    pub(crate) fn take_callback(&mut self) -> Option<SendCallback> { self.callback.take() }
}

impl fmt::Debug for Outbound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outbound")
            .field("to", &self.to)
            .field("content", &self.content)
            .field("attempts", &self.attempts)
            .field("callback", &self.callback.as_ref().map(|_| ".."))
            .finish()
    }
}
