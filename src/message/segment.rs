//! One part of a concatenated SMS as retrieved from the modem.

use chrono::NaiveDateTime;

use super::id::{CompositeId, Location};

/// A single SMS-sized fragment of a multi-part message.
///
/// Segments are produced by the inbound pipeline for records whose
/// `total_segments` exceeds one; single-part records become a
/// [`Message`](crate::message::Message) directly. The `location` empties once
/// the slot has been moved into the deletion index, at which point the modem
/// copy is owed a `delete` and the record no longer owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Modem slot the segment still occupies, if the gateway has not yet
    /// scheduled it for deletion.
    pub location: Option<Location>,
    /// Originator address.
    pub from: String,
    /// Text carried by this part alone.
    pub content: String,
    /// User-data-header reference number, when the modem reported one.
    pub udh: Option<u32>,
    /// 1-based position of this part within its group.
    pub sequence: u32,
    /// Declared number of parts in the group.
    pub total: u32,
    /// Modem receive time.
    pub timestamp: NaiveDateTime,
    /// Service-centre time, when present.
    pub smsc_timestamp: Option<NaiveDateTime>,
    /// Identity of the group this segment belongs to.
    pub id: CompositeId,
}

impl Segment {
    /// Whether `sequence` falls inside the declared `1..=total` range.
    #[must_use]
    pub fn in_range(&self) -> bool { self.sequence >= 1 && self.sequence <= self.total }
}
