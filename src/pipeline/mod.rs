//! The three-phase poll pipeline.
//!
//! Each poll cycle runs receive, delete, and transmit, strictly in that
//! order. A phase that fails is reported through the `error` hook with
//! global scope and never stops the phases after it; per-record failures are
//! handled inside each phase and never stop sibling records.

pub(crate) mod deletion;
pub(crate) mod inbound;
pub(crate) mod outbound;

use crate::gateway::GatewayCore;

/// Run one full poll cycle against the helper.
pub(crate) async fn tick(core: &GatewayCore) {
    if let Err(error) = inbound::run(core).await {
        core.report(error);
    }
    if let Err(error) = deletion::run(core).await {
        core.report(error);
    }
    if let Err(error) = outbound::run(core).await {
        core.report(error);
    }
}
