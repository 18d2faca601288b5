//! Receive phase: retrieve, reassemble, deliver.

use log::debug;
use serde_json::Value;

use crate::{
    error::{GatewayError, HandlerError},
    gateway::{DeletionOwner, GatewayCore},
    message::{
        wire::{self, Incoming},
        CompositeId, Message, Segment,
    },
    reassembly::{self, PollIndex},
    runner::RunnerError,
    store::Persistence,
};

const RETRIEVE: &str = "retrieve";

/// Run the receive phase: fetch all stored messages, route and reassemble
/// them, then deliver everything that completed.
pub(crate) async fn run(core: &GatewayCore) -> Result<(), GatewayError> {
    let root = core.runner.run(&[RETRIEVE.to_owned()]).await?;
    let records: Vec<Value> = serde_json::from_value(root).map_err(RunnerError::Parse)?;
    if core.config.debug {
        debug!("retrieve returned {} records", records.len());
    }

    let mut poll_index = PollIndex::new();
    for record in records {
        if let Err(error) = process_record(core, record, &mut poll_index).await {
            core.report(error);
        }
    }

    deliver(core).await;
    Ok(())
}

async fn process_record(
    core: &GatewayCore,
    record: Value,
    poll_index: &mut PollIndex,
) -> Result<(), GatewayError> {
    match wire::transform(record)? {
        Incoming::Single(message) => {
            core.state().inbound.push_back(message);
        }
        Incoming::Part(segment) => process_segment(core, segment, poll_index).await?,
    }
    Ok(())
}

/// The multi-part path: persist the segment, skip groups already delivered
/// this poll, move durably-persisted locations into the deletion index, and
/// attempt reassembly against the stored peers.
async fn process_segment(
    core: &GatewayCore,
    mut segment: Segment,
    poll_index: &mut PollIndex,
) -> Result<(), GatewayError> {
    let persistence = match persist(core, &segment).await {
        Ok(persistence) => persistence,
        // Not persisted: keep the modem copy, but keep processing; the
        // stored peers may still complete the group.
        Err(error) => {
            core.report(GatewayError::Receive {
                from: segment.from.clone(),
                reason: error.to_string(),
            });
            Persistence::Volatile
        }
    };

    if poll_index.covers(&segment.id) {
        if core.config.debug {
            debug!("group {} already reassembled this poll", segment.id);
        }
        return Ok(());
    }

    if persistence == Persistence::Durable {
        if let Some(location) = segment.location.take() {
            core.state().deletions.insert(
                location,
                DeletionOwner {
                    from: segment.from.clone(),
                    id: Some(segment.id.clone()),
                },
            );
        }
    }

    let peers = load_peers(core, &segment.id)
        .await
        .map_err(|error| GatewayError::Receive {
            from: segment.from.clone(),
            reason: error.to_string(),
        })?;

    if let Some(message) = reassembly::reassemble(&segment, &peers)? {
        poll_index.record(&message);
        core.state().inbound.push_back(message);
    }
    Ok(())
}

/// Deliver every queued message to the `receive` handler.
///
/// Acknowledged messages have all their member locations scheduled for
/// deletion, and composites additionally release their stored segments.
/// Refused messages are simply dropped from the queue; the modem still holds
/// them, so the next poll retrieves them again.
async fn deliver(core: &GatewayCore) {
    let queued: Vec<Message> = core.state().inbound.drain(..).collect();
    if queued.is_empty() {
        return;
    }

    let Some(handler) = core.hooks().receive else {
        core.report(GatewayError::HandlerMissing { event: "receive" });
        return;
    };

    for message in queued {
        match handler(message.clone()).await {
            Ok(()) => {
                {
                    let mut state = core.state();
                    for location in &message.locations {
                        state.deletions.insert(
                            *location,
                            DeletionOwner {
                                from: message.from.clone(),
                                id: message.id.clone(),
                            },
                        );
                    }
                }
                if let Some(id) = &message.id {
                    release(core, id).await;
                }
            }
            Err(error) => {
                // A refusal is not an error event; the embedder already
                // knows, and the next poll re-delivers.
                debug!("receive handler refused message from {}: {error}", message.from);
            }
        }
    }
}

async fn persist(core: &GatewayCore, segment: &Segment) -> Result<Persistence, HandlerError> {
    match core.hooks().receive_segment {
        Some(hook) => hook(segment.clone()).await,
        None => core.segment_store().save(segment).await,
    }
}

async fn load_peers(
    core: &GatewayCore,
    id: &CompositeId,
) -> Result<Vec<Segment>, HandlerError> {
    match core.hooks().return_segments {
        Some(hook) => hook(id.clone()).await,
        None => core.segment_store().load(id).await,
    }
}

async fn release(core: &GatewayCore, id: &CompositeId) {
    match core.hooks().release_segments {
        Some(hook) => hook(id.clone()),
        None => core.segment_store().release(id).await,
    }
}
