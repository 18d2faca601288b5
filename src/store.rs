//! Persistence seam for inbound multi-part segments.
//!
//! Reassembly needs every part of a group, but parts may arrive across
//! several polls. Where they wait in the meantime is the embedder's choice:
//! the `receive_segment` / `return_segments` / `release_segments` hooks can
//! delegate to durable storage, and anything not hooked falls back to the
//! in-memory store here.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;

use crate::{
    error::HandlerError,
    message::{CompositeId, Segment},
};

/// How a segment was persisted.
///
/// Only durably-persisted segments may be deleted from the modem: the modem
/// copy is the sole copy of anything volatile, and must survive a restart of
/// the embedding process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Persistence {
    /// The segment survives the embedding process; the modem copy may go.
    Durable,
    /// The segment is held in memory only; the modem copy must stay.
    Volatile,
}

/// Storage for segments awaiting their siblings.
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Record one segment, reporting whether it is now durably persisted.
    async fn save(&self, segment: &Segment) -> Result<Persistence, HandlerError>;

    /// Return every known segment for the group.
    async fn load(&self, id: &CompositeId) -> Result<Vec<Segment>, HandlerError>;

    /// Drop stored segments for a delivered group.
    async fn release(&self, id: &CompositeId);
}

/// Built-in volatile store backed by a segment cache in process memory.
///
/// Within a group, `save` keeps one record per segment number, replacing an
/// existing record only when the newcomer's timestamp is not strictly older.
/// Delivered groups are evicted on `release`, so the cache does not outlive
/// the messages it serves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cache: Mutex<HashMap<CompositeId, Vec<Segment>>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of groups currently cached.
    #[must_use]
    pub fn cached_groups(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl SegmentStore for MemoryStore {
    async fn save(&self, segment: &Segment) -> Result<Persistence, HandlerError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let group = cache.entry(segment.id.clone()).or_default();
        match group.iter_mut().find(|s| s.sequence == segment.sequence) {
            Some(existing) => {
                if segment.timestamp >= existing.timestamp {
                    *existing = segment.clone();
                }
            }
            None => group.push(segment.clone()),
        }
        Ok(Persistence::Volatile)
    }

    async fn load(&self, id: &CompositeId) -> Result<Vec<Segment>, HandlerError> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.get(id).cloned().unwrap_or_default())
    }

    async fn release(&self, id: &CompositeId) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.remove(id);
    }
}
