//! Deliverable messages, single-part or reassembled.

use chrono::NaiveDateTime;

use super::{
    id::{CompositeId, Location},
    segment::Segment,
};

/// A fully-received message awaiting delivery to the embedder.
///
/// Singles carry exactly one location and no `parts`; reassembled composites
/// carry the ordered locations of every part still owed to the modem, the
/// chosen segment records in `parts`, and the group identity in `id`. The
/// timestamps are the latest seen across all parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Originator address.
    pub from: String,
    /// Full message body. For composites this is the in-order concatenation
    /// of every part's content.
    pub content: String,
    /// Modem slots that must be deleted once the embedder accepts delivery.
    /// Slots already moved into the deletion index do not reappear here.
    pub locations: Vec<Location>,
    /// The segment records a composite was assembled from; empty for singles.
    pub parts: Vec<Segment>,
    /// Modem receive time (latest across parts).
    pub timestamp: NaiveDateTime,
    /// Service-centre time (latest across parts), when any part carried one.
    pub smsc_timestamp: Option<NaiveDateTime>,
    /// Group identity for composites; `None` for single-part messages.
    pub id: Option<CompositeId>,
}

impl Message {
    /// Build a deliverable record for a non-concatenated SMS.
    #[must_use]
    pub fn single(
        location: Location,
        from: impl Into<String>,
        content: impl Into<String>,
        timestamp: NaiveDateTime,
        smsc_timestamp: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            from: from.into(),
            content: content.into(),
            locations: vec![location],
            parts: Vec::new(),
            timestamp,
            smsc_timestamp,
            id: None,
        }
    }

    /// Whether this record was reassembled from multiple segments.
    #[must_use]
    pub const fn is_composite(&self) -> bool { self.id.is_some() }
}
