//! Identifier newtypes shared across the pipeline.

use derive_more::{Display, From, Into};

/// Opaque modem-side storage slot for one stored SMS.
///
/// Locations are handed out by the modem via the helper's `retrieve` output
/// and are only ever echoed back to the helper's `delete` command.
///
/// # Examples
///
/// ```
/// use smsgate::message::Location;
/// let slot = Location::new(5);
/// assert_eq!(slot.get(), 5);
/// assert_eq!(slot.to_string(), "5");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0}")]
pub struct Location(u32);

impl Location {
    /// Wrap a raw slot number reported by the helper.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Return the underlying slot number.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }
}

/// Identity of a concatenated-SMS group.
///
/// All segments of one logical message share an originator, a user-data-header
/// reference number, and a total part count. The canonical rendering
/// `<from>-<reference>-<total>` is what embedder-side segment stores key on.
///
/// # Examples
///
/// ```
/// use smsgate::message::CompositeId;
/// let id = CompositeId::new("+15551234", Some(7), 2);
/// assert_eq!(id.to_string(), "+15551234-7-2");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Display)]
#[display("{from}-{reference}-{total}")]
pub struct CompositeId {
    from: String,
    reference: u32,
    total: u32,
}

impl CompositeId {
    /// Build the identity for a segment group.
    ///
    /// A missing user-data-header reference collapses to `0`, so messages
    /// that arrive without one still group consistently.
    #[must_use]
    pub fn new(from: impl Into<String>, reference: Option<u32>, total: u32) -> Self {
        Self {
            from: from.into(),
            reference: reference.unwrap_or(0),
            total,
        }
    }

    /// Originator address shared by every segment in the group.
    #[must_use]
    pub fn from(&self) -> &str { &self.from }

    /// Concatenation reference number (`0` when the modem reported none).
    #[must_use]
    pub const fn reference(&self) -> u32 { self.reference }

    /// Number of parts the group is declared to contain.
    #[must_use]
    pub const fn total(&self) -> u32 { self.total }
}
