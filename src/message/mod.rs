//! Message domain types for the gateway.
//!
//! This module collects the records that flow through the polling pipeline.
//! Each sub-module focuses on a single concept: opaque modem identifiers,
//! inbound segments, deliverable messages, outbound items, and the raw wire
//! shapes emitted by the `gammu-json` helper.

pub mod composite;
pub mod id;
pub mod outbound;
pub mod segment;
pub(crate) mod wire;

pub use composite::Message;
pub use id::{CompositeId, Location};
pub use outbound::{Outbound, SendCallback, TransmitOutcome};
pub use segment::Segment;
pub use wire::TransformError;
