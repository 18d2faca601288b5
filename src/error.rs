//! Error surface for the gateway core.
//!
//! Errors are reported through the `error` hook rather than aborting work:
//! per-record failures do not stop sibling records, per-phase failures do not
//! stop the poll cycle, and nothing here terminates a running instance.

use thiserror::Error;

use crate::{message::TransformError, reassembly::ReassemblyError, runner::RunnerError};

/// Which part of the pipeline an error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorScope {
    /// Phase-level or instance-level failures.
    Global,
    /// Failures confined to one inbound record.
    Receive,
    /// Failures confined to one outbound item.
    Transmit,
}

impl std::fmt::Display for ErrorScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Global => "global",
            Self::Receive => "receive",
            Self::Transmit => "transmit",
        })
    }
}

/// Top-level error type delivered to the embedder's `error` hook.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The helper subprocess failed to run, exited non-zero, or produced
    /// output that was not valid JSON.
    #[error("helper invocation failed: {0}")]
    Subprocess(#[from] RunnerError),
    /// One inbound record could not be transformed.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// A composite could not be materialized from its segments.
    #[error("reassembly failed: {0}")]
    Reassembly(#[from] ReassemblyError),
    /// Processing one inbound record failed outside of transform and
    /// reassembly, e.g. in an embedder persistence handler.
    #[error("receiving message from {from} failed: {reason}")]
    Receive { from: String, reason: String },
    /// An outbound item exhausted its transmit attempts.
    #[error("giving up on message to {to} after {attempts} attempts")]
    TransmitExhausted { to: String, attempts: u32 },
    /// An event fired that requires a handler, and none was registered.
    #[error("no {event} handler registered")]
    HandlerMissing { event: &'static str },
}

impl GatewayError {
    /// Scope the error is reported under.
    #[must_use]
    pub const fn scope(&self) -> ErrorScope {
        match self {
            Self::Subprocess(_) | Self::HandlerMissing { .. } => ErrorScope::Global,
            Self::Transform(_) | Self::Reassembly(_) | Self::Receive { .. } => ErrorScope::Receive,
            Self::TransmitExhausted { .. } => ErrorScope::Transmit,
        }
    }
}

/// Failure reported by an embedder-supplied handler.
///
/// The gateway treats handler failures as refusals: a failed `receive` keeps
/// the message on the modem for the next poll, and a failed `receive_segment`
/// keeps the segment off the deletion index.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct HandlerError {
    reason: String,
}

impl HandlerError {
    /// Wrap a reason string.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_follow_error_kind() {
        let exhausted = GatewayError::TransmitExhausted {
            to: "+15551234".into(),
            attempts: 2,
        };
        assert_eq!(exhausted.scope(), ErrorScope::Transmit);

        let missing = GatewayError::HandlerMissing { event: "receive" };
        assert_eq!(missing.scope(), ErrorScope::Global);
        assert_eq!(missing.to_string(), "no receive handler registered");

        let refused = GatewayError::Receive {
            from: "+15551234".into(),
            reason: "disk full".into(),
        };
        assert_eq!(refused.scope(), ErrorScope::Receive);
    }

    #[test]
    fn scope_display_is_lowercase() {
        assert_eq!(ErrorScope::Global.to_string(), "global");
        assert_eq!(ErrorScope::Receive.to_string(), "receive");
        assert_eq!(ErrorScope::Transmit.to_string(), "transmit");
    }
}
