//! Reassembly of concatenated SMS from their segments.
//!
//! Segments for one logical message can arrive in any order, across any
//! number of polls, and with duplicate or stale copies mixed in. The engine
//! here resolves that into at most one composite per group: [`SlotIndex`]
//! chooses one record per segment number, [`reassemble`] drives it for a
//! trigger segment plus its stored peers, and [`PollIndex`] stops a group
//! from being reassembled twice within a single poll cycle.

pub mod error;
pub mod poll;
pub mod slots;

pub use error::ReassemblyError;
pub use poll::PollIndex;
pub use slots::SlotIndex;

use log::debug;

use crate::message::{Message, Segment};

/// Attempt to reassemble the group `trigger` belongs to.
///
/// Peers are inserted first and the trigger last, so on equal timestamps the
/// trigger's copy of a segment wins. Peers that fail validation (foreign
/// group, inconsistent part count, out-of-range segment number) are skipped;
/// they cannot invalidate the rest of the group.
///
/// Returns `Ok(None)` while parts are still missing, and the materialized
/// composite once every slot is filled.
///
/// # Errors
///
/// Returns [`ReassemblyError`] when a complete-looking group cannot be
/// materialized, which indicates slot bookkeeping was violated.
pub fn reassemble(
    trigger: &Segment,
    peers: &[Segment],
) -> Result<Option<Message>, ReassemblyError> {
    let mut slots = SlotIndex::new(trigger.id.clone(), trigger.total);
    for peer in peers {
        if !slots.insert(peer) {
            debug!(
                "skipping inconsistent peer: id={} sequence={} total={}",
                peer.id, peer.sequence, peer.total
            );
        }
    }
    if !slots.insert(trigger) {
        debug!(
            "trigger segment rejected by its own group: id={} sequence={}",
            trigger.id, trigger.sequence
        );
        return Ok(None);
    }

    if slots.is_complete() {
        slots.into_message().map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests;
