//! Per-message reassembly index: one chosen record per segment number.

use std::collections::HashMap;

use crate::message::{CompositeId, Message, Segment};

use super::error::ReassemblyError;

/// Mapping from segment number (`1..=total`) to the chosen segment record.
///
/// Candidates compete per slot by timestamp: an occupant only survives a new
/// candidate when the candidate is strictly older. Insertion order therefore
/// matters for ties, which callers exploit by inserting the trigger segment
/// last.
#[derive(Debug)]
pub struct SlotIndex {
    id: CompositeId,
    total: u32,
    slots: HashMap<u32, Segment>,
}

impl SlotIndex {
    /// Empty index for the group `id` with `total` expected parts.
    #[must_use]
    pub fn new(id: CompositeId, total: u32) -> Self {
        Self {
            id,
            total,
            slots: HashMap::new(),
        }
    }

    /// Offer a candidate record for its slot.
    ///
    /// Returns `false` when the candidate does not belong in this index:
    /// its group differs, it declares a different part count, or its segment
    /// number falls outside `1..=total`. A candidate strictly older than the
    /// slot's occupant is accepted but changes nothing.
    pub fn insert(&mut self, candidate: &Segment) -> bool {
        if candidate.id != self.id || candidate.total != self.total || !candidate.in_range() {
            return false;
        }
        if let Some(occupant) = self.slots.get(&candidate.sequence) {
            if candidate.timestamp < occupant.timestamp {
                return true;
            }
        }
        self.slots.insert(candidate.sequence, candidate.clone());
        true
    }

    /// Whether every slot from 1 to `total` is occupied.
    #[must_use]
    pub fn is_complete(&self) -> bool { self.slots.len() as u64 == u64::from(self.total) }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize { self.slots.len() }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Materialize the composite from the chosen records.
    ///
    /// The composite copies its base fields from slot 1, then walks slots 2
    /// through `total` in order, concatenating content, collecting the parts
    /// and their still-owned locations, and keeping the latest timestamp of
    /// any part for each timestamp field.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError`] when a required slot is unoccupied.
    pub fn into_message(mut self) -> Result<Message, ReassemblyError> {
        let first = self
            .slots
            .remove(&1)
            .ok_or_else(|| ReassemblyError::MissingFirstSegment {
                id: self.id.clone(),
            })?;

        let mut content = first.content.clone();
        let mut locations: Vec<_> = first.location.into_iter().collect();
        let mut timestamp = first.timestamp;
        let mut smsc_timestamp = first.smsc_timestamp;
        let from = first.from.clone();
        let mut parts = vec![first];

        for sequence in 2..=self.total {
            let segment =
                self.slots
                    .remove(&sequence)
                    .ok_or_else(|| ReassemblyError::MissingSegment {
                        id: self.id.clone(),
                        sequence,
                    })?;
            content.push_str(&segment.content);
            locations.extend(segment.location);
            timestamp = timestamp.max(segment.timestamp);
            smsc_timestamp = match (smsc_timestamp, segment.smsc_timestamp) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
            parts.push(segment);
        }

        Ok(Message {
            from,
            content,
            locations,
            parts,
            timestamp,
            smsc_timestamp,
            id: Some(self.id),
        })
    }
}
