//! Errors raised while materializing a composite.

use thiserror::Error;

use crate::message::CompositeId;

/// Structural inconsistency found while materializing a composite.
///
/// These only fire after a slot index claims completeness, so either variant
/// means the index was corrupted between the completeness check and
/// materialization.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReassemblyError {
    /// Slot 1 is unoccupied; the composite has nothing to copy its base
    /// fields from.
    #[error("group {id} is missing its first segment")]
    MissingFirstSegment { id: CompositeId },
    /// A later slot is unoccupied.
    #[error("group {id} is missing segment {sequence}")]
    MissingSegment { id: CompositeId, sequence: u32 },
}
