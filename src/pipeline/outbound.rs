//! Transmit phase: batch, send, retry.

use log::{debug, warn};

use crate::{
    error::GatewayError,
    gateway::GatewayCore,
    message::{Outbound, TransmitOutcome},
    runner::RunnerError,
};

const SEND: &str = "send";

/// Run the transmit phase over the head of the outbound queue.
///
/// A batch holds at most `transmit_batch_size - 1` items. Items the helper
/// confirms leave the queue; failed items retry in place until the attempt
/// limit abandons them. Items queued while the helper runs are untouched and
/// wait for the next cycle.
pub(crate) async fn run(core: &GatewayCore) -> Result<(), GatewayError> {
    let batch = take_batch(core);
    if batch.is_empty() {
        return Ok(());
    }

    let mut args = Vec::with_capacity(batch.len() * 2 + 1);
    args.push(SEND.to_owned());
    for item in &batch {
        args.push(item.to().to_owned());
        args.push(item.content().to_owned());
    }
    if core.config.debug {
        debug!("transmitting {} queued messages", batch.len());
    }

    let root = match core.runner.run(&args).await {
        Ok(root) => root,
        Err(error) => {
            requeue(core, batch);
            return Err(error.into());
        }
    };
    let outcomes: Vec<TransmitOutcome> = match serde_json::from_value(root) {
        Ok(outcomes) => outcomes,
        Err(error) => {
            requeue(core, batch);
            return Err(RunnerError::Parse(error).into());
        }
    };

    // Slots keep batch order so survivors rejoin the queue in the order
    // they left it.
    let mut slots: Vec<Option<Outbound>> = batch.into_iter().map(Some).collect();
    let hooks = core.hooks();
    for outcome in outcomes {
        let Some(slot) = outcome
            .index
            .checked_sub(1)
            .and_then(|index| slots.get_mut(index))
        else {
            warn!("send result index {} is outside the batch", outcome.index);
            continue;
        };
        let Some(mut item) = slot.take() else {
            warn!("send result index {} reported twice", outcome.index);
            continue;
        };

        if outcome.is_success() {
            hooks.transmit(&item, &outcome);
            if let Some(callback) = item.take_callback() {
                callback(Ok(&outcome));
            }
            continue;
        }

        item.record_attempt();
        let limit = core.config.max_transmit_attempts;
        if limit == 0 || item.attempts() < limit {
            *slot = Some(item);
        } else {
            let error = GatewayError::TransmitExhausted {
                to: item.to().to_owned(),
                attempts: item.attempts(),
            };
            if let Some(callback) = item.take_callback() {
                callback(Err(&error));
            }
            core.report(error);
        }
    }

    requeue(core, slots.into_iter().flatten().collect());
    Ok(())
}

fn take_batch(core: &GatewayCore) -> Vec<Outbound> {
    let mut state = core.state();
    if state.outbound.is_empty() {
        return Vec::new();
    }
    let cap = core.config.transmit_batch_size.saturating_sub(1).max(1);
    let take = state.outbound.len().min(cap);
    state.outbound.drain(..take).collect()
}

/// Put unfinished items back at the head of the queue, preserving their
/// original order ahead of anything queued since.
fn requeue(core: &GatewayCore, items: Vec<Outbound>) {
    if items.is_empty() {
        return;
    }
    let mut state = core.state();
    for item in items.into_iter().rev() {
        state.outbound.push_front(item);
    }
}
